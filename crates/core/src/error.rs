// crates/core/src/error.rs
use thiserror::Error;

use crate::types::JobId;

/// Reasons a submission is rejected before any job is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unsupported registry type: {0}. Currently only 'npm' is supported.")]
    UnsupportedRegistry(String),

    #[error("Package identifier is required")]
    MissingPackage,

    #[error("Invalid package identifier: {0}")]
    InvalidPackage(String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),
}

/// Errors raised by the job registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Job already exists: {0}")]
    DuplicateJob(JobId),
}

/// Errors returned synchronously from a submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
