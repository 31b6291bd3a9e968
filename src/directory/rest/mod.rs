//! REST implementation of the task directory.

mod client;
mod models;

pub use client::RestDirectory;
