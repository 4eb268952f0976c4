// crates/server/src/lib.rs
//! HTTP control server for the batch job.
//!
//! Thin Axum layer over `batch_control_core::JobController`: request
//! handlers translate HTTP calls into controller calls and log drains.

pub mod config;
pub mod demo;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::*;
pub use routes::api_routes;
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware.
///
/// This sets up:
/// - Job control routes (start, stop, logs, status) and health
/// - CORS allowing any origin, since the control page is served elsewhere
/// - Request tracing
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api_routes(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Integration Tests
// ============================================================================
