//! Job status endpoint.
//!
//! - GET /status/{job_id} — current snapshot of one job

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use mcp_installer_core::JobRecord;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /status/{job_id} — poll a job. Never waits for progress.
pub async fn job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobRecord>> {
    state
        .orchestrator
        .status(&job_id)
        .map(Json)
        .ok_or(ApiError::JobNotFound(job_id))
}

/// GET /status/ — the id segment is missing.
async fn missing_job_id() -> ApiError {
    ApiError::BadRequest("Job ID required".to_string())
}

/// Build the status router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status/", get(missing_job_id))
        .route("/status/{job_id}", get(job_status))
}
