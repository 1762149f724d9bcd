// crates/server/src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mcp_installer_core::{SubmitError, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::routes::install::InstallResponse;

/// Structured JSON error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// API error types that map to HTTP status codes.
///
/// Submission errors (`Validation`, `InvalidBody`, `SubmitFailed`) keep the
/// `{success, message}` install response shape; the rest use [`ErrorResponse`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Failed to start installation: {0}")]
    SubmitFailed(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Validation(e) => ApiError::Validation(e),
            SubmitError::Registry(e) => ApiError::SubmitFailed(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Validation(e) => {
                tracing::warn!(error = %e, "Install request rejected");
                (StatusCode::BAD_REQUEST, Json(InstallResponse::rejected(e.to_string()))).into_response()
            }
            ApiError::InvalidBody(msg) => {
                tracing::warn!(message = %msg, "Invalid install request body");
                (StatusCode::BAD_REQUEST, Json(InstallResponse::rejected(self.to_string()))).into_response()
            }
            ApiError::SubmitFailed(msg) => {
                tracing::error!(message = %msg, "Failed to start installation");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(InstallResponse::rejected("Failed to start installation")),
                )
                    .into_response()
            }
            ApiError::JobNotFound(id) => {
                tracing::debug!(job_id = %id, "Job not found");
                (
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse::with_details("Job not found", format!("Job ID: {id}"))),
                )
                    .into_response()
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(msg.clone()))).into_response()
            }
        }
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
