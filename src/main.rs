//! bookingd entry point.
//!
//! Loads configuration, composes the route table, runs the bootstrap and
//! waits for Ctrl+C. All fatal startup errors land here: they are logged
//! and turned into a non-zero exit code. Nothing deeper in the stack ever
//! exits the process.

use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookingd::config::{self, ConfigError};
use bookingd::routes;
use bookingd::routing::{MountError, Router};
use bookingd::server::{Server, StartError};
use bookingd::store::StoreManager;

#[derive(Debug, Error)]
enum FatalError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("route composition: {0}")]
    Routes(#[from] MountError),

    #[error("startup: {0}")]
    Start(#[from] StartError),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookingd=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("bookingd v0.1.0 starting");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal error, exiting");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), FatalError> {
    let config = config::load()?;
    tracing::info!(
        port = config.listener.port,
        store = %config.store.url,
        require_store_ready = config.readiness.require_store_ready,
        "configuration loaded"
    );

    let manager = Arc::new(StoreManager::new());

    let mut router = Router::new();
    router.mount("/auth", routes::auth_routes()?)?;
    router.mount("/health", routes::health_routes(manager.clone())?)?;

    let server = Server::new(config, router, manager);
    let handle = server.start().await?;
    tracing::info!(address = %handle.local_addr(), "serving requests");

    shutdown_signal().await;
    handle.shutdown().await;
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
