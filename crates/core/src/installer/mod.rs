// crates/core/src/installer/mod.rs
//! PackageInstaller trait defining the interface to external package managers.

mod npm;

pub use npm::NpmInstaller;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{PackageSpec, RegistryType};

/// A failed install: whatever the package manager printed, plus why it failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct InstallFailure {
    pub output: String,
    pub detail: String,
}

impl InstallFailure {
    pub fn new(output: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            detail: detail.into(),
        }
    }
}

/// An external package manager that can install one package at a time.
///
/// Implementations:
/// - `NpmInstaller` — runs `npm install -g <spec>`
///
/// `install` may block for as long as the package manager runs; it is only
/// ever awaited from the job's own background task.
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// The registry this installer serves.
    fn registry(&self) -> RegistryType;

    /// Install `package`, returning the combined output on success.
    async fn install(&self, package: &PackageSpec) -> Result<String, InstallFailure>;
}
