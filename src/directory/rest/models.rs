//! Request bodies for the task endpoints.

use chrono::NaiveDate;
use serde::Serialize;

use crate::directory::{CategoryChoice, Priority, TaskDraft, TaskPatch};

/// Body for `POST /tasks/`.
#[derive(Debug, Serialize)]
pub(super) struct TaskPayload {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl From<TaskDraft> for TaskPayload {
    fn from(draft: TaskDraft) -> Self {
        Self {
            title: draft.title,
            description: draft.description,
            category: draft.category.into_name(),
            priority: draft.priority,
            due_date: draft.due_date,
        }
    }
}

/// Body for `PUT /tasks/{id}/`. Only the fields being changed are sent;
/// a present-but-null `due_date` clears the date.
#[derive(Debug, Serialize)]
pub(super) struct TaskPatchPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
}

impl From<TaskPatch> for TaskPatchPayload {
    fn from(patch: TaskPatch) -> Self {
        Self {
            title: patch.title,
            description: patch.description,
            category: patch.category.map(CategoryChoice::into_name),
            priority: patch.priority,
            due_date: patch.due_date,
        }
    }
}

/// Body for `PATCH /tasks/{id}/`.
#[derive(Debug, Serialize)]
pub(super) struct CompletionPayload {
    pub completed: bool,
}
