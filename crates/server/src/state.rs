// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Duration;

use mcp_installer_core::{JobRegistry, NpmInstaller, Orchestrator};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Install orchestrator; owns the handle to the process-wide job registry.
    pub orchestrator: Orchestrator,
    /// Cadence of the SSE heartbeat stream.
    pub heartbeat_interval: Duration,
    /// Timeout applied to the JSON endpoints.
    pub request_timeout: Duration,
    /// Cancelled when the server begins shutting down; ends open heartbeat streams.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create state around an already configured orchestrator, with default
    /// timings and a fresh shutdown token.
    pub fn new(orchestrator: Orchestrator) -> Arc<Self> {
        let defaults = ServerConfig::default();
        Arc::new(Self {
            orchestrator,
            heartbeat_interval: defaults.heartbeat_interval(),
            request_timeout: defaults.request_timeout(),
            shutdown: CancellationToken::new(),
        })
    }

    /// Build production state: a new registry and the npm installer from `config`.
    pub fn from_config(config: &ServerConfig, shutdown: CancellationToken) -> Arc<Self> {
        let registry = Arc::new(JobRegistry::new());
        let orchestrator = Orchestrator::new(registry)
            .with_installer(Arc::new(NpmInstaller::with_program(config.npm_bin.clone())));
        Arc::new(Self {
            orchestrator,
            heartbeat_interval: config.heartbeat_interval(),
            request_timeout: config.request_timeout(),
            shutdown,
        })
    }

    pub fn registry(&self) -> &JobRegistry {
        self.orchestrator.registry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_new() {
        let state = AppState::new(Orchestrator::new(Arc::new(JobRegistry::new())));
        assert!(state.registry().is_empty());
        assert_eq!(state.heartbeat_interval, Duration::from_secs(5));
        assert!(!state.shutdown.is_cancelled());
    }

    #[test]
    fn test_app_state_from_config() {
        let config = ServerConfig {
            heartbeat_interval_secs: 1,
            request_timeout_secs: 3,
            ..ServerConfig::default()
        };
        let token = CancellationToken::new();
        let state = AppState::from_config(&config, token.clone());

        assert_eq!(state.heartbeat_interval, Duration::from_secs(1));
        assert_eq!(state.request_timeout, Duration::from_secs(3));
        token.cancel();
        assert!(state.shutdown.is_cancelled());
    }
}
