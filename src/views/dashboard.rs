//! Read-only dashboard summary view.

use crate::directory::{Task, TaskDirectory, TaskFilter, TaskStats};

use super::LoadPhase;

/// Number of recent tasks shown alongside the statistics.
const RECENT_LIMIT: usize = 5;

/// Statistics snapshot plus the most recent tasks, fetched together.
pub struct DashboardController<D> {
    directory: D,
    stats: Option<TaskStats>,
    recent: Vec<Task>,
    phase: LoadPhase,
}

impl<D: TaskDirectory> DashboardController<D> {
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            stats: None,
            recent: Vec::new(),
            phase: LoadPhase::Idle,
        }
    }

    #[must_use]
    pub fn stats(&self) -> Option<&TaskStats> {
        self.stats.as_ref()
    }

    #[must_use]
    pub fn recent(&self) -> &[Task] {
        &self.recent
    }

    #[must_use]
    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    /// Fetch the statistics snapshot and the recent-task sample
    /// concurrently; either failure fails the whole load.
    pub async fn load(&mut self) {
        self.phase = LoadPhase::Loading;
        let unfiltered = TaskFilter::default();

        match tokio::try_join!(
            self.directory.statistics(),
            self.directory.list(&unfiltered)
        ) {
            Ok((stats, tasks)) => {
                self.stats = Some(stats);
                self.recent = tasks.into_iter().take(RECENT_LIMIT).collect();
                self.phase = LoadPhase::Loaded;
            }
            Err(error) => self.phase = LoadPhase::Failed(error),
        }
    }
}
