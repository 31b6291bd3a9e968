//! View-side controllers reconciling a local task cache with the
//! directory.

mod dashboard;
mod list;
#[cfg(test)]
pub(crate) mod testing;

pub use dashboard::DashboardController;
pub use list::{LoadPhase, TaskListController};
