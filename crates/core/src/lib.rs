// crates/core/src/lib.rs
//! Asynchronous package-install job orchestration.
//!
//! - [`JobRegistry`] — process-wide, lock-guarded map of job records
//! - [`Orchestrator`] — validates submissions and spawns one writer task per job
//! - [`PackageInstaller`] — seam for the external package manager ([`NpmInstaller`])

pub mod error;
pub mod installer;
pub mod metrics;
pub mod orchestrator;
pub mod registry;
pub mod types;

pub use error::*;
pub use installer::{InstallFailure, NpmInstaller, PackageInstaller};
pub use orchestrator::{JobIdGenerator, Orchestrator};
pub use registry::{JobRegistry, UpdateOutcome};
pub use types::*;
