// crates/core/src/registry.rs
//! Process-wide store of install jobs.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::error::RegistryError;
use crate::types::{JobId, JobRecord, JobStatus, JobUpdate};

/// Result of a [`JobRegistry::update`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum UpdateOutcome {
    Applied,
    /// No job with that id; nothing changed.
    UnknownJob,
    /// The write would break the lifecycle order; nothing changed.
    InvalidTransition { from: JobStatus, to: JobStatus },
}

/// Concurrency-safe map of job id to job record.
///
/// Jobs are never removed. Reads take the shared lock and return clones, so
/// callers always see a whole record and never hold the lock themselves.
/// Uses `std::sync::RwLock` since no critical section crosses an `.await`.
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, JobRecord>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a new `pending` record.
    pub fn create(&self, job_id: JobId) -> Result<JobRecord, RegistryError> {
        let mut jobs = self.write();
        match jobs.entry(job_id) {
            Entry::Occupied(e) => Err(RegistryError::DuplicateJob(e.key().clone())),
            Entry::Vacant(e) => {
                let record = JobRecord::pending(e.key().clone(), Utc::now());
                e.insert(record.clone());
                Ok(record)
            }
        }
    }

    /// Snapshot of a single job.
    pub fn get(&self, job_id: &str) -> Option<JobRecord> {
        self.read().get(job_id).cloned()
    }

    /// Replace the mutable fields of a job and refresh `updated_at`.
    ///
    /// Unknown ids and out-of-order transitions leave the registry untouched.
    pub fn update(&self, job_id: &str, update: JobUpdate) -> UpdateOutcome {
        let mut jobs = self.write();
        let Some(record) = jobs.get_mut(job_id) else {
            tracing::warn!(job_id, status = %update.status, "Ignoring update for unknown job");
            return UpdateOutcome::UnknownJob;
        };

        if !record.status.can_transition_to(update.status) {
            tracing::warn!(
                job_id,
                from = %record.status,
                to = %update.status,
                "Ignoring out-of-order job update"
            );
            return UpdateOutcome::InvalidTransition {
                from: record.status,
                to: update.status,
            };
        }

        record.status = update.status;
        record.message = update.message;
        record.output = update.output;
        record.error = update.error;
        // Wall clock can step backwards; updated_at must not.
        record.updated_at = Utc::now().max(record.updated_at);
        UpdateOutcome::Applied
    }

    /// Snapshots of every job, most recently started first.
    pub fn list(&self) -> Vec<JobRecord> {
        let mut records: Vec<JobRecord> = self.read().values().cloned().collect();
        records.sort_by(|a, b| {
            b.started_at
                .cmp(&a.started_at)
                .then_with(|| b.job_id.cmp(&a.job_id))
        });
        records
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<JobId, JobRecord>> {
        self.jobs.read().unwrap_or_else(|e| {
            tracing::error!("RwLock poisoned reading jobs map, recovering");
            e.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<JobId, JobRecord>> {
        self.jobs.write().unwrap_or_else(|e| {
            tracing::error!("RwLock poisoned writing jobs map, recovering");
            e.into_inner()
        })
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn test_create_and_get() {
        let registry = JobRegistry::new();
        let created = registry.create(JobId::new("job-1")).unwrap();

        assert_eq!(created.status, JobStatus::Pending);
        assert_eq!(created.started_at, created.updated_at);
        assert_eq!(registry.get("job-1"), Some(created));
        assert_eq!(registry.get("job-0"), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_create_duplicate_fails() {
        let registry = JobRegistry::new();
        let first = registry.create(JobId::new("job-1")).unwrap();

        let err = registry.create(JobId::new("job-1")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateJob(JobId::new("job-1")));
        // The original record is untouched.
        assert_eq!(registry.get("job-1"), Some(first));
    }

    #[test]
    fn test_update_unknown_job_is_noop() {
        let registry = JobRegistry::new();
        let outcome = registry.update("job-404", JobUpdate::running());
        assert_eq!(outcome, UpdateOutcome::UnknownJob);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_full_lifecycle() {
        let registry = JobRegistry::new();
        let created = registry.create(JobId::new("job-1")).unwrap();

        assert_eq!(registry.update("job-1", JobUpdate::running()), UpdateOutcome::Applied);
        let running = registry.get("job-1").unwrap();
        assert_eq!(running.status, JobStatus::Running);
        assert_eq!(running.message, "Installing package...");
        assert!(running.updated_at >= created.updated_at);

        let outcome = registry.update("job-1", JobUpdate::completed("added 1 package".into()));
        assert_eq!(outcome, UpdateOutcome::Applied);
        let done = registry.get("job-1").unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.output.as_deref(), Some("added 1 package"));
        assert_eq!(done.error, None);
        assert_eq!(done.started_at, created.started_at);
        assert!(done.updated_at >= running.updated_at);
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let registry = JobRegistry::new();
        registry.create(JobId::new("job-1")).unwrap();

        // pending -> completed skips running
        let outcome = registry.update("job-1", JobUpdate::completed("x".into()));
        assert_eq!(
            outcome,
            UpdateOutcome::InvalidTransition {
                from: JobStatus::Pending,
                to: JobStatus::Completed,
            }
        );
        assert_eq!(registry.get("job-1").unwrap().status, JobStatus::Pending);

        let _ = registry.update("job-1", JobUpdate::running());
        let _ = registry.update("job-1", JobUpdate::failed("Installation failed", "".into(), "boom"));
        let terminal = registry.get("job-1").unwrap();

        // Terminal records never change again.
        let outcome = registry.update("job-1", JobUpdate::completed("late".into()));
        assert!(matches!(outcome, UpdateOutcome::InvalidTransition { .. }));
        assert_eq!(registry.get("job-1").unwrap(), terminal);
    }

    #[test]
    fn test_list_newest_first() {
        let registry = JobRegistry::new();
        registry.create(JobId::new("job-1")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        registry.create(JobId::new("job-2")).unwrap();

        let ids: Vec<String> = registry
            .list()
            .into_iter()
            .map(|r| r.job_id.to_string())
            .collect();
        assert_eq!(ids, vec!["job-2", "job-1"]);
    }

    #[test]
    fn test_concurrent_writers_do_not_cross_contaminate() {
        let registry = Arc::new(JobRegistry::new());
        let n = 32;

        std::thread::scope(|s| {
            for i in 0..n {
                let writer = Arc::clone(&registry);
                s.spawn(move || {
                    let id = format!("job-{i}");
                    writer.create(JobId::new(id.clone())).unwrap();
                    let _ = writer.update(&id, JobUpdate::running());
                    let update = if i % 2 == 0 {
                        JobUpdate::completed(format!("output {i}"))
                    } else {
                        JobUpdate::failed("Installation failed", format!("output {i}"), format!("error {i}"))
                    };
                    assert_eq!(writer.update(&id, update), UpdateOutcome::Applied);
                });
                // Readers run alongside the writers.
                let reader = Arc::clone(&registry);
                s.spawn(move || {
                    for record in reader.list() {
                        assert!(record.updated_at >= record.started_at);
                    }
                });
            }
        });

        assert_eq!(registry.len(), n);
        for i in 0..n {
            let record = registry.get(&format!("job-{i}")).unwrap();
            assert_eq!(record.output, Some(format!("output {i}")));
            if i % 2 == 0 {
                assert_eq!(record.status, JobStatus::Completed);
                assert_eq!(record.error, None);
            } else {
                assert_eq!(record.status, JobStatus::Failed);
                assert_eq!(record.error, Some(format!("error {i}")));
            }
        }
    }
}
