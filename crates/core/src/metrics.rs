// crates/core/src/metrics.rs
//! Job metrics recorded through the `metrics` facade.
//!
//! Recording is a no-op until a recorder is installed (the server installs a
//! Prometheus recorder at startup).

use std::time::Duration;

use metrics::{counter, gauge, histogram};

use crate::types::JobStatus;

pub const JOBS_SUBMITTED_TOTAL: &str = "installer_jobs_submitted_total";
pub const JOBS_REJECTED_TOTAL: &str = "installer_jobs_rejected_total";
pub const JOBS_FINISHED_TOTAL: &str = "installer_jobs_finished_total";
pub const JOBS_RUNNING: &str = "installer_jobs_running";
pub const INSTALL_DURATION_SECONDS: &str = "installer_install_duration_seconds";

pub fn record_submitted(registry: &str) {
    counter!(JOBS_SUBMITTED_TOTAL, "registry" => registry.to_string()).increment(1);
}

pub fn record_rejected(reason: &'static str) {
    counter!(JOBS_REJECTED_TOTAL, "reason" => reason).increment(1);
}

pub fn record_started() {
    gauge!(JOBS_RUNNING).increment(1.0);
}

pub fn record_finished(status: JobStatus, duration: Duration) {
    gauge!(JOBS_RUNNING).decrement(1.0);
    counter!(JOBS_FINISHED_TOTAL, "status" => status.as_str()).increment(1);
    histogram!(INSTALL_DURATION_SECONDS, "status" => status.as_str()).record(duration.as_secs_f64());
}
