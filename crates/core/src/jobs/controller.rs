// crates/core/src/jobs/controller.rs
//! Single-flight controller for the batch job.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::harness::{self, BatchTask, TaskContext};
use super::types::{JobSnapshot, JobStatus, RunId, StartRequest};
use crate::error::{JobError, TaskError};
use crate::log_sink::{LogEntry, LogSink};

/// Terminal log line written after every run, whatever the outcome.
pub const FINISHED_MESSAGE: &str = "Process finished.";

/// Mutable state of the current (or most recent) run.
///
/// Guarded by one mutex: the status check-and-set in `start`, the flag write
/// in `stop` and the completion transition never interleave.
#[derive(Debug)]
struct RunState {
    status: JobStatus,
    run_id: Option<RunId>,
    cancel: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl RunState {
    fn new() -> Self {
        Self {
            status: JobStatus::Idle,
            run_id: None,
            cancel: None,
            handle: None,
            started_at: None,
            finished_at: None,
        }
    }
}

/// Owns job state and guarantees at most one run at a time.
///
/// Built once at startup and shared with request handlers through
/// `AppState`. `start` must be called from inside a Tokio runtime.
pub struct JobController {
    task: Arc<dyn BatchTask>,
    logs: Arc<LogSink>,
    run: Arc<Mutex<RunState>>,
    next_run_id: AtomicU64,
}

impl JobController {
    pub fn new(task: Arc<dyn BatchTask>, logs: Arc<LogSink>) -> Self {
        Self {
            task,
            logs,
            run: Arc::new(Mutex::new(RunState::new())),
            next_run_id: AtomicU64::new(1),
        }
    }

    /// Start a new run unless one is already in progress.
    ///
    /// On success the log buffer is cleared, a fresh cancellation token is
    /// issued and the task is spawned. The call returns without waiting for
    /// the task.
    pub fn start(&self, request: StartRequest) -> Result<RunId, JobError> {
        let mut run = lock(&self.run);
        if run.status == JobStatus::Running {
            tracing::debug!(run_id = ?run.run_id, "Start rejected: job already running");
            return Err(JobError::AlreadyRunning);
        }

        let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        self.logs.clear();

        tracing::info!(
            run_id,
            task = self.task.name(),
            count = request.count,
            headless = request.headless,
            "Job started"
        );

        run.status = JobStatus::Running;
        run.run_id = Some(run_id);
        run.cancel = Some(cancel.clone());
        run.started_at = Some(Utc::now());
        run.finished_at = None;

        let ctx = TaskContext::new(run_id, Arc::clone(&self.logs), cancel);
        let task = Arc::clone(&self.task);
        let logs = Arc::clone(&self.logs);
        let state = Arc::clone(&self.run);
        run.handle = Some(tokio::spawn(async move {
            let outcome = harness::execute(task, request, ctx).await;
            complete(&state, &logs, run_id, outcome);
        }));

        Ok(run_id)
    }

    /// Request cooperative cancellation of the running job.
    ///
    /// Only sets the flag; the task decides when to honour it.
    pub fn stop(&self) -> Result<(), JobError> {
        let run = lock(&self.run);
        if run.status != JobStatus::Running {
            return Err(JobError::NotRunning);
        }
        if let Some(cancel) = &run.cancel {
            cancel.cancel();
        }
        tracing::info!(run_id = ?run.run_id, "Stop requested");
        Ok(())
    }

    pub fn status(&self) -> JobStatus {
        lock(&self.run).status
    }

    pub fn is_running(&self) -> bool {
        self.status() == JobStatus::Running
    }

    pub fn snapshot(&self) -> JobSnapshot {
        let run = lock(&self.run);
        JobSnapshot {
            status: run.status,
            run_id: run.run_id,
            started_at: run.started_at.map(|t| t.to_rfc3339()),
            finished_at: run.finished_at.map(|t| t.to_rfc3339()),
            cancel_requested: run.cancel.as_ref().is_some_and(|c| c.is_cancelled()),
        }
    }

    pub fn logs(&self) -> &Arc<LogSink> {
        &self.logs
    }

    /// Destructively read everything logged since the previous drain.
    pub fn drain_logs(&self) -> Vec<LogEntry> {
        self.logs.drain()
    }

    pub fn task_name(&self) -> &str {
        self.task.name()
    }

    /// Wait for the most recent run to finish.
    ///
    /// Returns `false` when there is no un-joined run. Each run can be joined
    /// once.
    pub async fn join(&self) -> bool {
        let handle = lock(&self.run).handle.take();
        match handle {
            Some(handle) => {
                if let Err(e) = handle.await {
                    tracing::error!(error = %e, "Job supervisor ended abnormally");
                }
                true
            }
            None => false,
        }
    }
}

/// Completion transition for run `run_id`. Runs on every exit path.
fn complete(
    run: &Mutex<RunState>,
    logs: &LogSink,
    run_id: RunId,
    outcome: Result<(), TaskError>,
) {
    let mut state = lock(run);
    match outcome {
        Ok(()) => tracing::info!(run_id, "Job completed"),
        Err(e) => {
            tracing::warn!(run_id, error = %e, "Job failed");
            logs.error(format!("Server Error: {e}"));
        }
    }
    logs.info(FINISHED_MESSAGE);
    state.status = JobStatus::Finished;
    state.finished_at = Some(Utc::now());
}

fn lock(run: &Mutex<RunState>) -> MutexGuard<'_, RunState> {
    run.lock().unwrap_or_else(PoisonError::into_inner)
}
