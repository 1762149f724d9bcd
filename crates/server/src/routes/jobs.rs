// crates/server/src/routes/jobs.rs
//! API routes for install job listing.
//!
//! - GET /jobs — List all jobs known to this process, newest first

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use mcp_installer_core::JobRecord;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct JobsResponse {
    pub jobs: Vec<JobRecord>,
    pub total: usize,
}

/// GET /jobs — List all jobs.
async fn list_jobs(State(state): State<Arc<AppState>>) -> Json<JobsResponse> {
    let jobs = state.registry().list();
    Json(JobsResponse {
        total: jobs.len(),
        jobs,
    })
}

/// Build the jobs router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/jobs", get(list_jobs))
}
