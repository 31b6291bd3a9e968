//! Typed access to the remote task-storage service.

pub mod rest;
mod traits;

pub use traits::{
    CategoryChoice, CompletionFilter, Priority, Task, TaskDirectory, TaskDraft, TaskFilter,
    TaskPatch, TaskStats,
};
