// crates/core/src/jobs/types.rs
//! Types for the single-flight job controller.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one job run. Starts at 1 and increases per successful start.
pub type RunId = u64;

/// Lifecycle state of the controlled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Idle,
    Running,
    Finished,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Finished => "finished",
        }
    }
}

/// Payload forwarded verbatim to the batch task.
///
/// The controller never inspects these fields. `password` is a pass-through
/// value and is redacted from `Debug` output so it cannot leak into logs.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct StartRequest {
    pub count: i64,
    pub password: String,
    pub headless: bool,
}

impl fmt::Debug for StartRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StartRequest")
            .field("count", &self.count)
            .field("password", &"<redacted>")
            .field("headless", &self.headless)
            .finish()
    }
}

/// Point-in-time copy of the controller state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    pub cancel_requested: bool,
}
