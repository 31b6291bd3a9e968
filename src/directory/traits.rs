//! Task directory contract and domain types.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!(
                "unknown priority '{other}' (expected high, medium or low)"
            )),
        }
    }
}

/// A task as stored by the remote service. The server owns every field;
/// clients hold transient copies per view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned identifier.
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub completed: bool,
    pub category: String,
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Completion-state constraint for a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl CompletionFilter {
    fn as_query(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Pending => Some("false"),
            Self::Completed => Some("true"),
        }
    }
}

impl FromStr for CompletionFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(format!(
                "unknown status '{other}' (expected all, pending or completed)"
            )),
        }
    }
}

/// Optional constraints narrowing a task listing. Absent fields impose
/// no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Only tasks filed under this category.
    pub category: Option<String>,
    /// Only tasks in this completion state.
    pub completion: CompletionFilter,
    /// Only tasks whose title contains this text.
    pub search: Option<String>,
}

impl TaskFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_query().is_empty()
    }

    /// Render the present constraints as query parameters.
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(category) = &self.category {
            if !category.is_empty() {
                params.push(("category", category.clone()));
            }
        }
        if let Some(completed) = self.completion.as_query() {
            params.push(("completed", completed.to_string()));
        }
        if let Some(search) = &self.search {
            if !search.trim().is_empty() {
                params.push(("search", search.clone()));
            }
        }
        params
    }
}

/// Category selection for a draft or patch: an existing category by
/// name, or a brand-new one. Both collapse to the name at the wire
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryChoice {
    Existing(String),
    New(String),
}

impl CategoryChoice {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Existing(name) | Self::New(name) => name,
        }
    }

    #[must_use]
    pub fn into_name(self) -> String {
        match self {
            Self::Existing(name) | Self::New(name) => name,
        }
    }
}

/// Fields for creating a task. Required-field validation is the
/// server's job; rejected drafts come back as [`ApiError::Validation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub category: CategoryChoice,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

/// Partial update. `None` fields are left untouched by the server;
/// `due_date: Some(None)` clears the date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<CategoryChoice>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

/// Server-aggregated task statistics snapshot. Opaque to the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub high_priority: u64,
    pub due_soon: u64,
}

/// Contract to the remote task-storage service. Implementations own no
/// task state and perform no caching or retries; retry policy belongs
/// to callers.
#[async_trait]
pub trait TaskDirectory: Send + Sync {
    /// List tasks matching `filter`, in server order (most recent first).
    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, ApiError>;

    /// Fetch a single task by id.
    async fn get(&self, id: u64) -> Result<Task, ApiError>;

    /// Create a task; the server assigns id, timestamps, and
    /// `completed = false`.
    async fn create(&self, draft: TaskDraft) -> Result<Task, ApiError>;

    /// Apply a partial update to an existing task.
    async fn update(&self, id: u64, patch: TaskPatch) -> Result<Task, ApiError>;

    /// Set the completion flag on a task.
    async fn set_completed(&self, id: u64, completed: bool) -> Result<Task, ApiError>;

    /// Delete a task. Deleting an already-gone id is `NotFound`.
    async fn remove(&self, id: u64) -> Result<(), ApiError>;

    /// Distinct category names currently in use.
    async fn categories(&self) -> Result<Vec<String>, ApiError>;

    /// Aggregated statistics for the current user's tasks.
    async fn statistics(&self) -> Result<TaskStats, ApiError>;
}
