// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use batch_control_core::JobController;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Single-flight controller for the batch job.
    pub jobs: Arc<JobController>,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(jobs: Arc<JobController>) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            jobs,
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
