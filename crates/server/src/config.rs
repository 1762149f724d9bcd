// crates/server/src/config.rs
//! Server configuration from command-line flags and environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use mcp_installer_observability::{LogConfig, LogFormat};

/// Default port for the installer server.
pub const DEFAULT_PORT: u16 = 3456;

/// Installer server configuration.
///
/// | Flag                        | Env Var                             | Default   |
/// |-----------------------------|-------------------------------------|-----------|
/// | `--host`                    | `INSTALLER_HOST`                    | `0.0.0.0` |
/// | `--port`                    | `INSTALLER_PORT`                    | `3456`    |
/// | `--npm-bin`                 | `INSTALLER_NPM_BIN`                 | `npm`     |
/// | `--request-timeout-secs`    | `INSTALLER_REQUEST_TIMEOUT_SECS`    | `15`      |
/// | `--shutdown-timeout-secs`   | `INSTALLER_SHUTDOWN_TIMEOUT_SECS`   | `10`      |
/// | `--heartbeat-interval-secs` | `INSTALLER_HEARTBEAT_INTERVAL_SECS` | `5`       |
/// | `--log-format`              | `INSTALLER_LOG_FORMAT`              | `compact` |
/// | `--log-dir`                 | `INSTALLER_LOG_DIR`                 | unset     |
#[derive(Debug, Clone, Parser)]
#[command(name = "mcp-installer", version, about = "Asynchronous MCP server package installer")]
pub struct ServerConfig {
    /// Address to bind.
    #[arg(long, env = "INSTALLER_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "INSTALLER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// npm executable used for installs.
    #[arg(long, env = "INSTALLER_NPM_BIN", default_value = "npm")]
    pub npm_bin: String,

    /// Per-request timeout for JSON endpoints. Does not apply to installs.
    #[arg(
        long,
        env = "INSTALLER_REQUEST_TIMEOUT_SECS",
        default_value_t = 15,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub request_timeout_secs: u64,

    /// How long to wait for open connections to drain on shutdown.
    #[arg(long, env = "INSTALLER_SHUTDOWN_TIMEOUT_SECS", default_value_t = 10)]
    pub shutdown_timeout_secs: u64,

    /// Seconds between heartbeat events on the SSE stream.
    #[arg(
        long,
        env = "INSTALLER_HEARTBEAT_INTERVAL_SECS",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub heartbeat_interval_secs: u64,

    /// Log line format: `compact` or `json`.
    #[arg(long, env = "INSTALLER_LOG_FORMAT", default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Also write logs to a daily rolling file in this directory.
    #[arg(long, env = "INSTALLER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            format: self.log_format,
            directory: self.log_dir.clone(),
            ..LogConfig::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            npm_bin: "npm".to_string(),
            request_timeout_secs: 15,
            shutdown_timeout_secs: 10,
            heartbeat_interval_secs: 5,
            log_format: LogFormat::Compact,
            log_dir: None,
        }
    }
}
