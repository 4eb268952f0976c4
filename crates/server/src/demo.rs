// crates/server/src/demo.rs
//! Built-in batch task served by the `batch-control` binary.
//!
//! Walks through `count` items at a fixed pace, logging each one and checking
//! the stop flag between items. The real workload plugs in through the same
//! `BatchTask` trait.

use std::time::Duration;

use async_trait::async_trait;
use batch_control_core::{BatchTask, StartRequest, TaskContext, TaskError};

pub struct TickerTask {
    step: Duration,
}

impl TickerTask {
    pub fn new(step: Duration) -> Self {
        Self { step }
    }
}

#[async_trait]
impl BatchTask for TickerTask {
    async fn run(&self, request: StartRequest, ctx: TaskContext) -> Result<(), TaskError> {
        if request.password.is_empty() {
            return Err(TaskError::failed("password is required"));
        }
        if request.count <= 0 {
            ctx.info("Nothing to do.");
            return Ok(());
        }

        let total = request.count;
        ctx.info(format!(
            "Starting batch of {total} items (headless: {})",
            request.headless
        ));

        for i in 1..=total {
            let stopped = ctx.should_stop()
                || tokio::select! {
                    _ = ctx.cancelled() => true,
                    _ = tokio::time::sleep(self.step) => false,
                };
            if stopped {
                ctx.warn(format!("Stop requested, halting after {} items.", i - 1));
                return Ok(());
            }
            ctx.info(format!("[{i}/{total}] item processed"));
        }

        ctx.info(format!("Batch complete: {total} items processed."));
        Ok(())
    }

    fn name(&self) -> &str {
        "ticker"
    }
}
