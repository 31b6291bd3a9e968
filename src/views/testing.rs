//! In-memory task directory used by the controller tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::directory::{
    CompletionFilter, Priority, Task, TaskDirectory, TaskDraft, TaskFilter, TaskPatch, TaskStats,
};
use crate::error::ApiError;

pub(crate) fn task(id: u64, title: &str, category: &str, completed: bool) -> Task {
    let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Task {
        id,
        title: title.to_string(),
        description: String::new(),
        completed,
        category: category.to_string(),
        priority: Priority::Medium,
        due_date: None,
        created_at: stamp,
        updated_at: stamp,
    }
}

/// Serves canned tasks with server-side filter semantics; the failure
/// flags exercise the controllers' error paths.
pub(crate) struct FakeDirectory {
    tasks: Mutex<Vec<Task>>,
    pub fail_reads: bool,
    pub fail_mutations: bool,
    next_id: AtomicU64,
}

impl FakeDirectory {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        Self {
            tasks: Mutex::new(tasks),
            fail_reads: false,
            fail_mutations: false,
            next_id: AtomicU64::new(next),
        }
    }

    fn server_error() -> ApiError {
        ApiError::Server {
            status: 500,
            message: "boom".to_string(),
        }
    }

    fn not_found(id: u64) -> ApiError {
        ApiError::NotFound(format!("task {id} not found"))
    }
}

#[async_trait]
impl TaskDirectory for FakeDirectory {
    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, ApiError> {
        if self.fail_reads {
            return Err(Self::server_error());
        }
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks
            .iter()
            .filter(|t| {
                filter
                    .category
                    .as_ref()
                    .map_or(true, |category| &t.category == category)
                    && match filter.completion {
                        CompletionFilter::All => true,
                        CompletionFilter::Pending => !t.completed,
                        CompletionFilter::Completed => t.completed,
                    }
                    && filter
                        .search
                        .as_ref()
                        .map_or(true, |search| t.title.contains(search.as_str()))
            })
            .cloned()
            .collect())
    }

    async fn get(&self, id: u64) -> Result<Task, ApiError> {
        if self.fail_reads {
            return Err(Self::server_error());
        }
        let tasks = self.tasks.lock().unwrap();
        tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, draft: TaskDraft) -> Result<Task, ApiError> {
        if self.fail_mutations {
            return Err(Self::server_error());
        }
        let stamp = Utc::now();
        let created = Task {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            title: draft.title,
            description: draft.description,
            completed: false,
            category: draft.category.into_name(),
            priority: draft.priority,
            due_date: draft.due_date,
            created_at: stamp,
            updated_at: stamp,
        };
        self.tasks.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: u64, patch: TaskPatch) -> Result<Task, ApiError> {
        if self.fail_mutations {
            return Err(Self::server_error());
        }
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(category) = patch.category {
            task.category = category.into_name();
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn set_completed(&self, id: u64, completed: bool) -> Result<Task, ApiError> {
        if self.fail_mutations {
            return Err(Self::server_error());
        }
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        task.completed = completed;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn remove(&self, id: u64) -> Result<(), ApiError> {
        if self.fail_mutations {
            return Err(Self::server_error());
        }
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn categories(&self) -> Result<Vec<String>, ApiError> {
        if self.fail_reads {
            return Err(Self::server_error());
        }
        let tasks = self.tasks.lock().unwrap();
        let mut categories: Vec<String> = Vec::new();
        for task in tasks.iter() {
            if !categories.contains(&task.category) {
                categories.push(task.category.clone());
            }
        }
        Ok(categories)
    }

    async fn statistics(&self) -> Result<TaskStats, ApiError> {
        if self.fail_reads {
            return Err(Self::server_error());
        }
        let tasks = self.tasks.lock().unwrap();
        let completed = tasks.iter().filter(|t| t.completed).count() as u64;
        let high_priority = tasks
            .iter()
            .filter(|t| t.priority == Priority::High && !t.completed)
            .count() as u64;
        Ok(TaskStats {
            total: tasks.len() as u64,
            completed,
            pending: tasks.len() as u64 - completed,
            high_priority,
            due_soon: 0,
        })
    }
}
