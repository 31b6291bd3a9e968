//! Client library for the TaskHub task-management service.
//!
//! Everything here talks to a remote REST API: [`SessionStore`] drives the
//! authentication lifecycle, [`directory::TaskDirectory`] is the typed
//! contract to the task store, and the controllers in [`views`] keep a
//! per-view task cache reconciled against the server.
//!
//! # Example
//!
//! ```rust,ignore
//! use taskhub::views::TaskListController;
//! use taskhub::{ApiClient, RestDirectory, SessionStore, TokenStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = ApiClient::new("http://localhost:8000/api")?;
//!     let mut session = SessionStore::new(api.clone(), TokenStore::new("/tmp/credential"));
//!     session.login("ada@example.com", "hunter2").await?;
//!
//!     let mut list = TaskListController::new(RestDirectory::new(api));
//!     list.refresh().await;
//!     for task in list.tasks() {
//!         println!("{} {}", task.id, task.title);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod directory;
pub mod error;
pub mod session;
pub mod views;

pub use api::ApiClient;
pub use directory::rest::RestDirectory;
pub use directory::{Task, TaskDirectory, TaskFilter};
pub use error::ApiError;
pub use session::{Session, SessionStore, TokenStore};
