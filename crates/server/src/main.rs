// crates/server/src/main.rs
//! MCP installer server binary.
//!
//! Parses configuration, installs logging and metrics, then serves the API
//! until SIGINT/SIGTERM. On shutdown open heartbeat streams are closed and
//! in-flight requests get a bounded drain window.

use anyhow::{Context, Result};
use clap::Parser;
use mcp_installer_observability::init_tracing;
use mcp_installer_server::{create_app, init_metrics, AppState, ServerConfig};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();

    // Keep the guard alive for the whole process so file logs get flushed.
    let _log_guard = init_tracing(&config.log_config())?;

    init_metrics();

    let shutdown = CancellationToken::new();
    let state = AppState::from_config(&config, shutdown.clone());
    let app = create_app(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        "MCP Installer Server v{} starting on {}",
        env!("CARGO_PKG_VERSION"),
        addr
    );
    tracing::info!(npm = %config.npm_bin, "Installing npm packages with");
    tracing::info!("CORS enabled for all origins");

    let token = shutdown.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result.context("server task panicked")??;
            return Ok(());
        }
        () = wait_for_signal() => {
            tracing::info!("Shutdown signal received, draining connections");
        }
    }

    shutdown.cancel();
    match tokio::time::timeout(config.shutdown_timeout(), server).await {
        Ok(joined) => joined.context("server task panicked")??,
        Err(_) => tracing::warn!(
            timeout_secs = config.shutdown_timeout_secs,
            "Graceful shutdown timed out, dropping remaining connections"
        ),
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
