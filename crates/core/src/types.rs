// crates/core/src/types.rs
//! Job records, statuses and install request types.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Unique identifier for an install job (`job-<unix-nanos>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for JobId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle status of an install job.
///
/// `Pending -> Running -> (Completed | Failed)`. Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether moving from `self` to `next` is a legal lifecycle step.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a job, as stored in the registry and returned to pollers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub job_id: JobId,
    pub status: JobStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub(crate) fn pending(job_id: JobId, now: DateTime<Utc>) -> Self {
        Self {
            job_id,
            status: JobStatus::Pending,
            message: "Installation queued".to_string(),
            output: None,
            error: None,
            started_at: now,
            updated_at: now,
        }
    }
}

/// The mutable part of a job record, written as one unit by `JobRegistry::update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobUpdate {
    pub status: JobStatus,
    pub message: String,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl JobUpdate {
    pub fn running() -> Self {
        Self {
            status: JobStatus::Running,
            message: "Installing package...".to_string(),
            output: None,
            error: None,
        }
    }

    pub fn completed(output: String) -> Self {
        Self {
            status: JobStatus::Completed,
            message: "Installation successful".to_string(),
            output: non_empty(output),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>, output: String, error: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            message: message.into(),
            output: non_empty(output),
            error: Some(error.into()),
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

/// Package sources the service knows how to install from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryType {
    Npm,
}

impl RegistryType {
    pub const SUPPORTED: &'static [RegistryType] = &[RegistryType::Npm];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryType::Npm => "npm",
        }
    }
}

impl FromStr for RegistryType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegistryType::SUPPORTED
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ValidationError::UnsupportedRegistry(s.to_string()))
    }
}

impl fmt::Display for RegistryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound install request as submitted by callers.
///
/// Fields default to empty so that missing values surface as validation
/// errors with a readable message rather than as body-decoding failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallRequest {
    #[serde(default)]
    pub package_identifier: String,
    #[serde(default)]
    pub registry_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl InstallRequest {
    pub fn new(package: impl Into<String>, registry_type: impl Into<String>) -> Self {
        Self {
            package_identifier: package.into(),
            registry_type: registry_type.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Check the request and turn it into an install target.
    ///
    /// Registry type is checked first so an unsupported source is always
    /// reported as such, whatever the package looks like.
    pub fn validate(&self) -> Result<InstallTarget, ValidationError> {
        let registry: RegistryType = self.registry_type.parse()?;

        let name = self.package_identifier.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingPackage);
        }
        if name.starts_with('-') || name.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidPackage(name.to_string()));
        }

        let version = match self.version.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(v) if v.starts_with('-') || v.chars().any(char::is_whitespace) => {
                return Err(ValidationError::InvalidVersion(v.to_string()));
            }
            Some(v) => Some(v.to_string()),
        };

        Ok(InstallTarget {
            registry,
            package: PackageSpec {
                name: name.to_string(),
                version,
            },
        })
    }
}

/// Fully qualified package specification passed to the package manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub version: Option<String>,
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.name, v),
            None => f.write_str(&self.name),
        }
    }
}

/// A validated request: where to install from and what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    pub registry: RegistryType,
    pub package: PackageSpec,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_transitions() {
        use JobStatus::*;
        assert!(Pending.can_transition_to(Running));
        assert!(Running.can_transition_to(Completed));
        assert!(Running.can_transition_to(Failed));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Failed));
        assert!(!Running.can_transition_to(Pending));
        assert!(!Running.can_transition_to(Running));
        for terminal in [Completed, Failed] {
            assert!(terminal.is_terminal());
            for next in [Pending, Running, Completed, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_package_spec_display() {
        let spec = PackageSpec {
            name: "left-pad".into(),
            version: None,
        };
        assert_eq!(spec.to_string(), "left-pad");

        let spec = PackageSpec {
            name: "@scope/server".into(),
            version: Some("1.2.3".into()),
        };
        assert_eq!(spec.to_string(), "@scope/server@1.2.3");
    }

    #[test]
    fn test_validate_accepts_npm() {
        let target = InstallRequest::new("left-pad", "npm").validate().unwrap();
        assert_eq!(target.registry, RegistryType::Npm);
        assert_eq!(target.package.to_string(), "left-pad");
    }

    #[test]
    fn test_validate_empty_version_means_latest() {
        let target = InstallRequest::new("left-pad", "npm")
            .with_version("")
            .validate()
            .unwrap();
        assert_eq!(target.package.version, None);

        let target = InstallRequest::new("left-pad", "npm")
            .with_version("1.3.0")
            .validate()
            .unwrap();
        assert_eq!(target.package.to_string(), "left-pad@1.3.0");
    }

    #[test]
    fn test_validate_rejects_unsupported_registry() {
        let err = InstallRequest::new("x", "pip").validate().unwrap_err();
        assert_eq!(err, ValidationError::UnsupportedRegistry("pip".into()));
        assert!(err
            .to_string()
            .starts_with("Unsupported registry type: pip."));
    }

    #[test]
    fn test_validate_registry_checked_before_package() {
        let err = InstallRequest::new("", "pypi").validate().unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedRegistry(_)));
    }

    #[test]
    fn test_validate_rejects_bad_packages() {
        assert_eq!(
            InstallRequest::new("   ", "npm").validate().unwrap_err(),
            ValidationError::MissingPackage
        );
        assert!(matches!(
            InstallRequest::new("--prefix=/tmp", "npm").validate(),
            Err(ValidationError::InvalidPackage(_))
        ));
        assert!(matches!(
            InstallRequest::new("left pad", "npm").validate(),
            Err(ValidationError::InvalidPackage(_))
        ));
        assert!(matches!(
            InstallRequest::new("left-pad", "npm")
                .with_version("-g")
                .validate(),
            Err(ValidationError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_install_request_deserialize() {
        let req: InstallRequest = serde_json::from_str(
            r#"{"packageIdentifier":"left-pad","registryType":"npm","version":"1.0.0"}"#,
        )
        .unwrap();
        assert_eq!(req, InstallRequest::new("left-pad", "npm").with_version("1.0.0"));

        let req: InstallRequest = serde_json::from_str(r#"{"registryType":"npm"}"#).unwrap();
        assert_eq!(req.package_identifier, "");
        assert_eq!(req.version, None);
    }

    #[test]
    fn test_job_record_serialize() {
        let now = Utc::now();
        let record = JobRecord::pending(JobId::new("job-1"), now);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["jobId"], "job-1");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["message"], "Installation queued");
        assert!(json.get("output").is_none());
        assert!(json.get("error").is_none());
        assert!(json["startedAt"].is_string());
        assert_eq!(json["startedAt"], json["updatedAt"]);
    }

    #[test]
    fn test_job_update_drops_empty_output() {
        let update = JobUpdate::completed(String::new());
        assert_eq!(update.output, None);
        let update = JobUpdate::failed("Installation failed", "npm ERR!".into(), "exit status 1");
        assert_eq!(update.output.as_deref(), Some("npm ERR!"));
        assert_eq!(update.error.as_deref(), Some("exit status 1"));
    }
}
