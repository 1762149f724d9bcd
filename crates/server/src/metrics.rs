//! Application metrics for Prometheus monitoring.
//!
//! This module provides:
//! - Prometheus metrics recorder initialization
//! - Descriptions for the job metrics recorded by `mcp_installer_core::metrics`
//! - Rendering for the `/metrics` endpoint

use std::sync::OnceLock;

use mcp_installer_core::metrics::{
    INSTALL_DURATION_SECONDS, JOBS_FINISHED_TOTAL, JOBS_REJECTED_TOTAL, JOBS_RUNNING,
    JOBS_SUBMITTED_TOTAL,
};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

/// Global Prometheus handle for rendering metrics. `None` when another
/// recorder was already installed, so ours never sees any samples.
static PROMETHEUS_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// This should be called once at application startup, before any metrics are recorded.
/// Returns `true` if this call installed the recorder, `false` if already initialized
/// or if a different global recorder was set first.
/// Concurrent callers block until the first one finishes.
pub fn init_metrics() -> bool {
    let mut installed = false;
    PROMETHEUS_HANDLE.get_or_init(|| {
        let handle = install_recorder(metrics::set_global_recorder);
        installed = handle.is_some();
        handle
    });
    installed
}

/// Build a recorder and hand it to `install`; the handle is only kept when
/// installation succeeds.
fn install_recorder<E>(
    install: impl FnOnce(PrometheusRecorder) -> Result<(), E>,
) -> Option<PrometheusHandle> {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    if install(recorder).is_err() {
        tracing::warn!("Failed to set global metrics recorder (already set)");
        return None;
    }
    describe_metrics();
    tracing::info!("Prometheus metrics initialized");
    Some(handle)
}

fn describe_metrics() {
    describe_counter!(JOBS_SUBMITTED_TOTAL, "Install jobs accepted");
    describe_counter!(
        JOBS_REJECTED_TOTAL,
        "Install requests rejected at submission, by reason"
    );
    describe_counter!(JOBS_FINISHED_TOTAL, "Install jobs that reached a terminal state");
    describe_gauge!(JOBS_RUNNING, "Install jobs currently running");
    describe_histogram!(
        INSTALL_DURATION_SECONDS,
        "Time spent in the package manager per job, in seconds"
    );
}

/// Render current metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get()?.as_ref().map(|h| h.render())
}
