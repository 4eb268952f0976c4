// crates/core/src/lib.rs
//! Control plane for a single long-running batch task.
//!
//! `JobController` enforces that at most one run is active, hands the task a
//! `TaskContext` for logging and cancellation polling, and routes its output
//! into a bounded `LogSink` that pollers drain.

pub mod error;
pub mod jobs;
pub mod log_sink;

pub use error::*;
pub use jobs::*;
pub use log_sink::*;
