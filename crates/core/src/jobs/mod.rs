// crates/core/src/jobs/mod.rs
//! Single-flight job control.
//!
//! Provides:
//! - `JobController`: start/stop gate owning the run state
//! - `BatchTask`: the contract an external batch task implements
//! - `TaskContext`: log and stop-flag callbacks handed to the task
//! - `BlockingTask`: adapter for synchronous task bodies

pub mod controller;
pub mod harness;
pub mod types;

pub use controller::{JobController, FINISHED_MESSAGE};
pub use harness::{BatchTask, BlockingTask, TaskContext};
pub use types::{JobSnapshot, JobStatus, RunId, StartRequest};
