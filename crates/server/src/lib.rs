// crates/server/src/lib.rs
//! MCP installer server library.
//!
//! Axum HTTP front end for the install job orchestrator: submit installs,
//! poll job status, and hold a heartbeat stream open.

pub mod config;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::*;
pub use crate::metrics::{init_metrics, render_metrics};
pub use routes::api_routes;
pub use state::AppState;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::Router;
use mcp_installer_observability::{trace_layer, MakeRequestUlid};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};

/// Create the Axum application with all routes and middleware.
///
/// This sets up:
/// - API routes (health, install, status, jobs, metrics, heartbeat)
/// - CORS for any origin; pre-flight requests never reach a handler
/// - Request ids (`x-request-id`, ULID) and request tracing
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    api_routes(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(trace_layer())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUlid))
        .layer(cors)
}

// ============================================================================
// Integration Tests
// ============================================================================
