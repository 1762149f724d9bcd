// crates/core/src/orchestrator.rs
//! Submission and background execution of install jobs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::error::{SubmitError, ValidationError};
use crate::installer::PackageInstaller;
use crate::metrics;
use crate::registry::{JobRegistry, UpdateOutcome};
use crate::types::{InstallRequest, InstallTarget, JobId, JobRecord, JobStatus, JobUpdate, RegistryType};

/// Issues `job-<unix-nanos>` identifiers, strictly increasing within the process.
pub struct JobIdGenerator {
    last: AtomicU64,
}

impl JobIdGenerator {
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    pub fn next_id(&self) -> JobId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        let bump = |prev: u64| now.max(prev + 1);
        let prev = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |prev| Some(bump(prev)))
            .unwrap_or_else(|prev| prev);
        JobId::new(format!("job-{}", bump(prev)))
    }
}

impl Default for JobIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Accepts install requests and runs each accepted job on its own task.
///
/// `submit` returns as soon as the job is registered; progress is only
/// observable by polling the registry.
pub struct Orchestrator {
    registry: Arc<JobRegistry>,
    installers: HashMap<RegistryType, Arc<dyn PackageInstaller>>,
    ids: JobIdGenerator,
}

impl Orchestrator {
    pub fn new(registry: Arc<JobRegistry>) -> Self {
        Self {
            registry,
            installers: HashMap::new(),
            ids: JobIdGenerator::new(),
        }
    }

    /// Register the installer used for its registry type, replacing any previous one.
    pub fn with_installer(mut self, installer: Arc<dyn PackageInstaller>) -> Self {
        self.installers.insert(installer.registry(), installer);
        self
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Validate `request`, register a pending job and spawn its installation.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, request: &InstallRequest) -> Result<JobId, SubmitError> {
        let target = request.validate().inspect_err(|e| {
            tracing::warn!(
                package = %request.package_identifier,
                registry_type = %request.registry_type,
                error = %e,
                "Rejected install request"
            );
            metrics::record_rejected(rejection_reason(e));
        })?;

        let job_id = self.ids.next_id();
        self.registry.create(job_id.clone())?;
        metrics::record_submitted(target.registry.as_str());
        tracing::info!(
            job_id = %job_id,
            package = %target.package,
            registry_type = %target.registry,
            "Install job queued"
        );

        let writer = PendingJob {
            registry: Arc::clone(&self.registry),
            job_id: job_id.clone(),
        };
        let installer = self.installers.get(&target.registry).cloned();
        tokio::spawn(run_job(writer, installer, target));

        Ok(job_id)
    }

    /// Current snapshot of a job, if it exists.
    pub fn status(&self, job_id: &str) -> Option<JobRecord> {
        self.registry.get(job_id)
    }
}

fn rejection_reason(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::UnsupportedRegistry(_) => "unsupported_registry",
        ValidationError::MissingPackage => "missing_package",
        ValidationError::InvalidPackage(_) => "invalid_package",
        ValidationError::InvalidVersion(_) => "invalid_version",
    }
}

/// Write capability for a freshly created job. Exactly one exists per job and
/// it is moved into the job's task, so no other code path writes that job.
struct PendingJob {
    registry: Arc<JobRegistry>,
    job_id: JobId,
}

impl PendingJob {
    fn start(self) -> RunningJob {
        self.write(JobUpdate::running());
        metrics::record_started();
        RunningJob {
            registry: self.registry,
            job_id: self.job_id,
            started: Instant::now(),
        }
    }

    fn write(&self, update: JobUpdate) {
        write_update(&self.registry, &self.job_id, update);
    }
}

struct RunningJob {
    registry: Arc<JobRegistry>,
    job_id: JobId,
    started: Instant,
}

impl RunningJob {
    fn complete(self, output: String) {
        self.finish(JobUpdate::completed(output));
    }

    fn fail(self, message: &str, output: String, error: String) {
        self.finish(JobUpdate::failed(message, output, error));
    }

    fn finish(self, update: JobUpdate) {
        let status = update.status;
        let elapsed = self.started.elapsed();
        write_update(&self.registry, &self.job_id, update);
        metrics::record_finished(status, elapsed);
        match status {
            JobStatus::Completed => tracing::info!(
                job_id = %self.job_id,
                elapsed_ms = elapsed.as_millis() as u64,
                "Install job completed"
            ),
            _ => tracing::warn!(
                job_id = %self.job_id,
                elapsed_ms = elapsed.as_millis() as u64,
                "Install job failed"
            ),
        }
    }
}

fn write_update(registry: &JobRegistry, job_id: &JobId, update: JobUpdate) {
    let status = update.status;
    let outcome = registry.update(job_id.as_str(), update);
    if outcome != UpdateOutcome::Applied {
        tracing::error!(job_id = %job_id, %status, ?outcome, "Job writer update was not applied");
    }
}

/// Body of a job's background task. Every failure ends up in the job record.
async fn run_job(
    job: PendingJob,
    installer: Option<Arc<dyn PackageInstaller>>,
    target: InstallTarget,
) {
    let job = job.start();

    let Some(installer) = installer else {
        job.fail(
            "Unsupported registry type",
            String::new(),
            format!("no installer configured for registry type {}", target.registry),
        );
        return;
    };

    // Run the install on its own task so a panicking installer still
    // leaves this job in a terminal state.
    let package = target.package;
    let result = tokio::spawn(async move { installer.install(&package).await }).await;

    match result {
        Ok(Ok(output)) => job.complete(output),
        Ok(Err(failure)) => job.fail("Installation failed", failure.output, failure.detail),
        Err(e) => job.fail(
            "Installation failed",
            String::new(),
            format!("installer task aborted: {e}"),
        ),
    }
}
