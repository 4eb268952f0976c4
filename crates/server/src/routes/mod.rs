// crates/server/src/routes/mod.rs
//! API route handlers for the control server.

pub mod health;
pub mod jobs;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined API router.
///
/// Routes:
/// - GET  /health - Health check
/// - POST /start  - Start the batch job (single-flight)
/// - POST /stop   - Request cooperative cancellation
/// - GET  /logs   - Drain buffered log lines
/// - GET  /status - Read-only job state
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::router())
        .merge(jobs::router())
        .with_state(state)
}
