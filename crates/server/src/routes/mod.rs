//! API route handlers for the installer server.

pub mod health;
pub mod heartbeat;
pub mod install;
pub mod jobs;
pub mod metrics;
pub mod status;

use std::sync::Arc;

use axum::Router;
use tower_http::timeout::TimeoutLayer;

use crate::state::AppState;

/// Create the combined router.
///
/// Routes:
/// - GET  /health         - Liveness and version
/// - POST /install        - Submit an install job
/// - GET  /status/{id}    - Poll a job
/// - GET  /jobs           - List all jobs
/// - GET  /metrics        - Prometheus metrics
/// - GET  /sse            - Heartbeat event stream
///
/// The request timeout applies to every route except the heartbeat stream.
pub fn api_routes(state: Arc<AppState>) -> Router {
    let json_routes = Router::new()
        .merge(health::router())
        .merge(install::router())
        .merge(status::router())
        .merge(jobs::router())
        .merge(metrics::router())
        .layer(TimeoutLayer::new(state.request_timeout));

    Router::new()
        .merge(json_routes)
        .merge(heartbeat::router())
        .with_state(state)
}
