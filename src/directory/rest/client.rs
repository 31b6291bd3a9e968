//! Task directory backed by the remote REST service.

use async_trait::async_trait;
use tracing::info;

use crate::api::ApiClient;
use crate::directory::{Task, TaskDirectory, TaskDraft, TaskFilter, TaskPatch, TaskStats};
use crate::error::ApiError;

use super::models::{CompletionPayload, TaskPatchPayload, TaskPayload};

/// Stateless wrapper translating the [`TaskDirectory`] contract into
/// REST calls.
#[derive(Clone)]
pub struct RestDirectory {
    api: ApiClient,
}

impl RestDirectory {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl TaskDirectory for RestDirectory {
    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, ApiError> {
        let query = filter.to_query();
        if query.is_empty() {
            self.api.get("/tasks/").await
        } else {
            self.api.get_with_query("/tasks/", &query).await
        }
    }

    async fn get(&self, id: u64) -> Result<Task, ApiError> {
        self.api.get(&format!("/tasks/{id}/")).await
    }

    async fn create(&self, draft: TaskDraft) -> Result<Task, ApiError> {
        let task: Task = self.api.post("/tasks/", &TaskPayload::from(draft)).await?;
        info!(id = task.id, title = %task.title, "task created");
        Ok(task)
    }

    async fn update(&self, id: u64, patch: TaskPatch) -> Result<Task, ApiError> {
        self.api
            .put(&format!("/tasks/{id}/"), &TaskPatchPayload::from(patch))
            .await
    }

    async fn set_completed(&self, id: u64, completed: bool) -> Result<Task, ApiError> {
        self.api
            .patch(&format!("/tasks/{id}/"), &CompletionPayload { completed })
            .await
    }

    async fn remove(&self, id: u64) -> Result<(), ApiError> {
        self.api.delete(&format!("/tasks/{id}/")).await?;
        info!(id, "task deleted");
        Ok(())
    }

    async fn categories(&self) -> Result<Vec<String>, ApiError> {
        self.api.get("/categories/").await
    }

    async fn statistics(&self) -> Result<TaskStats, ApiError> {
        self.api.get("/tasks/stats/").await
    }
}
