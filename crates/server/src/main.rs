// crates/server/src/main.rs
//! batch-control server binary.
//!
//! Wires the built-in batch task into a `JobController` and serves the
//! control API until Ctrl-C.

use std::sync::Arc;

use anyhow::Result;
use batch_control_core::{JobController, LogSink};
use batch_control_server::config::DEFAULT_LOG_FILTER;
use batch_control_server::demo::TickerTask;
use batch_control_server::{create_app, AppState, Config};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let logs = Arc::new(LogSink::new(config.log_capacity));
    let task = Arc::new(TickerTask::new(config.step()));
    let jobs = Arc::new(JobController::new(task, logs));
    let app = create_app(AppState::new(jobs));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    eprintln!("\n  batch-control v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("  \u{2192} http://{}\n", listener.local_addr()?);
    tracing::info!(%addr, log_capacity = config.log_capacity, "Control server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Control server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
