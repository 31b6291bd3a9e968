//! Filterable task-list view state.

use tracing::{debug, warn};

use crate::directory::{Task, TaskDirectory, TaskFilter};
use crate::error::ApiError;

/// Load state of a view.
#[derive(Debug, Default)]
pub enum LoadPhase {
    /// No load attempted yet.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The last load succeeded.
    Loaded,
    /// The last load failed; the error is kept for display.
    Failed(ApiError),
}

impl LoadPhase {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The preserved error, when the last load failed.
    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// In-memory reflection of a filtered task collection.
///
/// The held tasks are a best-effort cache: wholesale replaced by each
/// successful list fetch, patched in place after a confirmed toggle,
/// and pruned after a confirmed delete. Order is whatever the server
/// returned last; nothing is re-sorted locally.
pub struct TaskListController<D> {
    directory: D,
    filter: TaskFilter,
    tasks: Vec<Task>,
    categories: Vec<String>,
    phase: LoadPhase,
    /// Monotonic stamp for list loads; completions carrying an older
    /// stamp are stale and must not replace the collection.
    generation: u64,
}

impl<D: TaskDirectory> TaskListController<D> {
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            filter: TaskFilter::default(),
            tasks: Vec::new(),
            categories: Vec::new(),
            phase: LoadPhase::Idle,
            generation: 0,
        }
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    #[must_use]
    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    /// Replace the filter criteria and refetch.
    pub async fn apply_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
        self.refresh().await;
    }

    /// Refetch the collection under the current filter.
    pub async fn refresh(&mut self) {
        let generation = self.begin_load();
        let result = self.directory.list(&self.filter).await;
        self.complete_load(generation, result);
    }

    fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.phase = LoadPhase::Loading;
        self.generation
    }

    fn complete_load(&mut self, generation: u64, result: Result<Vec<Task>, ApiError>) {
        if generation != self.generation {
            debug!(generation, latest = self.generation, "discarding stale list response");
            return;
        }
        match result {
            Ok(tasks) => {
                self.tasks = tasks;
                self.phase = LoadPhase::Loaded;
            }
            Err(error) => {
                self.phase = LoadPhase::Failed(error);
            }
        }
    }

    /// Flip a task's completion flag, patching the cached entry in
    /// place once the server confirms. The patch lands only after
    /// confirmation, so there is nothing to roll back; failures are
    /// logged and leave the cache as it was.
    pub async fn toggle_completion(&mut self, id: u64) {
        let Some(current) = self.tasks.iter().find(|t| t.id == id).map(|t| t.completed) else {
            warn!(id, "toggle requested for a task not in view");
            return;
        };

        match self.directory.set_completed(id, !current).await {
            Ok(updated) => {
                // The entry may have been deleted while the call was in
                // flight; a missing slot makes this a no-op.
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == id) {
                    *slot = updated;
                }
            }
            Err(error) => warn!(id, error = %error, "failed to update task"),
        }
    }

    /// Delete a task and drop it from the cache. On failure the entry
    /// stays and the error is handed back for display.
    ///
    /// # Errors
    /// Propagates the directory error; the cache is untouched.
    pub async fn delete(&mut self, id: u64) -> Result<(), ApiError> {
        self.directory.remove(id).await?;
        self.tasks.retain(|t| t.id != id);
        Ok(())
    }

    /// Best-effort refresh of the category choices; failures are logged
    /// and do not disturb the list.
    pub async fn refresh_categories(&mut self) {
        match self.directory.categories().await {
            Ok(categories) => self.categories = categories,
            Err(error) => warn!(error = %error, "failed to load categories"),
        }
    }
}
