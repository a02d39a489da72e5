//! GhostHub — Desktop companion ghost runtime
//!
//! Headless host binary: loads configuration, discovers ghost plugins,
//! activates the first one, and runs until shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use ghosthub_core::config::HostConfig;
use ghosthub_core::error::GhostError;
use ghosthub_core::events::GhostEventKind;
use ghosthub_host::FsHostBridge;
use ghosthub_runtime::GhostManager;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Runtime error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<HostConfig, GhostError> {
    let env = std::env::var("GHOSTHUB_ENV").unwrap_or_else(|_| "development".to_string());
    HostConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &HostConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main host run function
async fn run(config: HostConfig) -> Result<(), GhostError> {
    tracing::info!("Starting GhostHub v{}", env!("CARGO_PKG_VERSION"));

    let roots: Vec<PathBuf> = config
        .plugins
        .directories
        .iter()
        .map(PathBuf::from)
        .collect();
    let bridge = Arc::new(FsHostBridge::new(roots));

    let manager = Arc::new(GhostManager::new(
        bridge,
        &config.plugins,
        &config.switching,
    )?);

    // Surface lifecycle transitions in the host log.
    let bus = manager.bus();
    bus.subscribe(GhostEventKind::Activate, |event| {
        tracing::info!(ghost_id = %event.ghost_id, "ghost activated");
    });
    bus.subscribe(GhostEventKind::Deactivate, |event| {
        tracing::info!(ghost_id = %event.ghost_id, "ghost deactivated");
    });

    if config.plugins.auto_load {
        let loaded = manager.load_all().await;
        tracing::info!(loaded, "plugins loaded");
    } else {
        tracing::info!("auto_load disabled, starting with an empty registry");
    }

    // Activate the first ghost, if any. An empty registry is a valid state.
    match manager.ghosts().await.first() {
        Some(first) => {
            manager.switch_to(&first.manifest.id).await;
        }
        None => tracing::info!("no ghosts loaded, idling"),
    }

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, tearing down...");

    manager.teardown().await;
    tracing::info!("GhostHub shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
