// crates/core/src/jobs/harness.rs
//! Execution harness bridging a batch task's callback contract to the core.
//!
//! The task receives its `StartRequest` plus a `TaskContext` carrying the
//! two callbacks it is allowed to use: a log sink and a stop predicate.
//! Cancellation is cooperative. A task that never checks `should_stop()`
//! runs until it finishes by itself.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::types::{RunId, StartRequest};
use crate::error::TaskError;
use crate::log_sink::{LogLevel, LogSink};

/// An externally-defined, long-running batch task.
#[async_trait]
pub trait BatchTask: Send + Sync {
    /// Run the task to completion.
    ///
    /// Progress goes through `ctx`. Long loops should check
    /// `ctx.should_stop()` (or await `ctx.cancelled()`) and return early
    /// once it is set.
    async fn run(&self, request: StartRequest, ctx: TaskContext) -> Result<(), TaskError>;

    /// Task name for logging.
    fn name(&self) -> &str;
}

/// Callbacks handed to a running task: log emission and the stop flag.
#[derive(Debug, Clone)]
pub struct TaskContext {
    run_id: RunId,
    logs: Arc<LogSink>,
    cancel: CancellationToken,
}

impl TaskContext {
    pub fn new(run_id: RunId, logs: Arc<LogSink>, cancel: CancellationToken) -> Self {
        Self {
            run_id,
            logs,
            cancel,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn log(&self, message: impl Into<String>, level: LogLevel) {
        self.logs.append(message, level);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(message, LogLevel::Info);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(message, LogLevel::Warn);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(message, LogLevel::Err);
    }

    /// True once a stop was requested for this run. Advisory only.
    pub fn should_stop(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves when a stop is requested for this run.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }
}

/// Adapter for synchronous task bodies.
///
/// The body runs on Tokio's blocking pool, so a task that blocks for minutes
/// never occupies an async worker that request handlers need.
pub struct BlockingTask<F> {
    name: String,
    body: Arc<F>,
}

impl<F> BlockingTask<F>
where
    F: Fn(StartRequest, TaskContext) -> Result<(), TaskError> + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body: Arc::new(body),
        }
    }
}

#[async_trait]
impl<F> BatchTask for BlockingTask<F>
where
    F: Fn(StartRequest, TaskContext) -> Result<(), TaskError> + Send + Sync + 'static,
{
    async fn run(&self, request: StartRequest, ctx: TaskContext) -> Result<(), TaskError> {
        let body = Arc::clone(&self.body);
        match tokio::task::spawn_blocking(move || (*body)(request, ctx)).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(TaskError::from_panic(e.into_panic())),
            Err(_) => Err(TaskError::Aborted),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Run `task` on its own Tokio task and fold every way it can end into a
/// `Result`. Panics become `TaskError::Panicked`, so they stay contained.
pub(crate) async fn execute(
    task: Arc<dyn BatchTask>,
    request: StartRequest,
    ctx: TaskContext,
) -> Result<(), TaskError> {
    let handle = tokio::spawn(async move { task.run(request, ctx).await });
    match handle.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(TaskError::from_panic(e.into_panic())),
        Err(_) => Err(TaskError::Aborted),
    }
}
