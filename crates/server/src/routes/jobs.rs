// crates/server/src/routes/jobs.rs
//! Job control routes.
//!
//! - POST /start: Start the batch job unless one is running
//! - POST /stop: Ask the running job to stop
//! - GET /logs: Drain buffered log lines (destructive)
//! - GET /status: Current job state (non-destructive)

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use batch_control_core::{JobSnapshot, JobStatus, LogEntry, StartRequest};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Response for POST /start and POST /stop.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ControlResponse {
    /// "ok", "error" or "ignored"
    pub status: String,
    pub message: String,
}

impl ControlResponse {
    fn new(status: &str, message: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
        }
    }
}

/// Response for GET /logs.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct LogsResponse {
    pub lines: Vec<LogEntry>,
}

/// Response for GET /status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub running: bool,
    pub task: String,
    #[serde(flatten)]
    pub job: JobSnapshot,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /start: Start the batch job.
///
/// A malformed body is rejected with 400 before any state changes. An
/// already-running job is reported in the body, not as an HTTP error.
async fn start_job(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> ApiResult<Json<ControlResponse>> {
    let Json(request) = payload?;

    let response = match state.jobs.start(request) {
        Ok(_) => ControlResponse::new("ok", "Started processing..."),
        Err(e) => ControlResponse::new("error", e.to_string()),
    };
    Ok(Json(response))
}

/// POST /stop: Request cooperative cancellation.
async fn stop_job(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    let response = match state.jobs.stop() {
        Ok(()) => ControlResponse::new("ok", "Stopping..."),
        Err(e) => ControlResponse::new("ignored", e.to_string()),
    };
    Json(response)
}

/// GET /logs: Return and forget everything logged since the last poll.
async fn drain_logs(State(state): State<Arc<AppState>>) -> Json<LogsResponse> {
    Json(LogsResponse {
        lines: state.jobs.drain_logs(),
    })
}

/// GET /status: Report job state without touching the log buffer.
async fn job_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let job = state.jobs.snapshot();
    Json(StatusResponse {
        running: job.status == JobStatus::Running,
        task: state.jobs.task_name().to_string(),
        job,
    })
}

/// Build the job control router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start", post(start_job))
        .route("/stop", post(stop_job))
        .route("/logs", get(drain_logs))
        .route("/status", get(job_status))
}

// ============================================================================
// Tests
// ============================================================================
