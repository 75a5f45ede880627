//! # QuickEats POS Agent
//!
//! Connects every configured restaurant to its POS and keeps menus synced
//! until the process is told to stop.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. tracing (RUST_LOG, default "info,quickeats=debug")                 │
//! │  2. ConnectorConfig: $QUICKEATS_POS_CONFIG or the platform default     │
//! │  3. one ServiceFactory + one PosManager for the whole process          │
//! │  4. initialize_restaurant for each enabled [[restaurants]] entry       │
//! │  5. wait for Ctrl-C / SIGTERM, then shut the manager down              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use quickeats_pos::{ConnectorConfig, PosManager, ServiceFactory};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,quickeats=debug";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_target(true)
        .init();

    info!("Starting QuickEats POS agent...");

    let config_path = std::env::var_os("QUICKEATS_POS_CONFIG").map(PathBuf::from);
    let config = ConnectorConfig::load(config_path)?;
    info!(
        restaurants = config.restaurants.len(),
        timeout_secs = config.http.timeout_secs,
        idempotency = %config.square.idempotency,
        "Configuration loaded"
    );

    let factory = Arc::new(ServiceFactory::from_config(&config)?);
    let manager = PosManager::new(factory);

    let mut connected = 0usize;
    for restaurant in config.restaurants.iter().filter(|r| r.enabled) {
        let report = manager.validate_config(restaurant);
        if !report.valid {
            warn!(
                restaurant_id = %restaurant.restaurant_id,
                errors = ?report.errors,
                "Skipping restaurant with invalid POS configuration"
            );
            continue;
        }

        let result = manager.initialize_restaurant(restaurant).await;
        if result.success {
            connected += 1;
        } else {
            error!(
                restaurant_id = %restaurant.restaurant_id,
                error = ?result.error,
                "Failed to initialize restaurant"
            );
        }
    }
    info!(connected, "POS agent running");

    shutdown_signal().await;
    manager.shutdown().await;

    info!("POS agent stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping auto-sync...");
}
