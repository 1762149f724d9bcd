// crates/server/src/routes/install.rs
//! Install submission endpoint.
//!
//! - POST /install — validate and queue an install job, returning its id immediately

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use mcp_installer_core::{InstallRequest, JobId};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Response to an install submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
}

impl InstallResponse {
    pub fn accepted(job_id: JobId) -> Self {
        Self {
            success: true,
            message: "Installation started".to_string(),
            job_id: Some(job_id),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            job_id: None,
        }
    }
}

/// POST /install — submit an install job.
///
/// Returns as soon as the job is registered; poll `/status/{jobId}` for the outcome.
/// The body is decoded as JSON whatever its `Content-Type`.
pub async fn install_package(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<InstallResponse>> {
    let request: InstallRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    let job_id = state.orchestrator.submit(&request)?;
    Ok(Json(InstallResponse::accepted(job_id)))
}

async fn method_not_allowed() -> (StatusCode, Json<InstallResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(InstallResponse::rejected("Method not allowed")),
    )
}

/// Build the install router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/install", post(install_package).fallback(method_not_allowed))
}
