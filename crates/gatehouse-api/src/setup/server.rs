//! Listener and graceful shutdown

use anyhow::{Context, Result};
use axum::Router;
use gatehouse_core::Config;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Serve `app` until SIGINT or SIGTERM, letting in-flight requests finish.
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        %addr,
        production = config.is_production(),
        max_upload_bytes = config.max_upload_bytes,
        upload_url_ttl_secs = config.upload_url_ttl_secs,
        "Gatekeeper listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// # Panics
/// Panics if a signal handler cannot be installed.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.expect("Failed to install Ctrl+C handler");
                tracing::info!(signal = "SIGINT", "Shutdown requested");
            }
            _ = sigterm.recv() => {
                tracing::info!(signal = "SIGTERM", "Shutdown requested");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        tracing::info!(signal = "ctrl_c", "Shutdown requested");
    }
}
