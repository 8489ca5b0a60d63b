//! sseudam-ar - Analysis Result service
//!
//! Receives object-detection results from the recognition service, scores
//! them into recycling points, updates the ranking ledger and notifies the
//! user's app (SSE) and the bin's display device.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sseudam_ar::AppState;
use sseudam_common::config::{database_path, resolve_root_folder, TomlConfig, ROOT_FOLDER_ENV};

/// Command-line arguments for sseudam-ar
#[derive(Parser, Debug)]
#[command(name = "sseudam-ar")]
#[command(about = "Analysis result scoring service for SSEUDAM")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "SSEUDAM_AR_PORT")]
    port: Option<u16>,

    /// TOML config file
    #[arg(short, long, env = "SSEUDAM_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Display device endpoint; empty string disables it
    #[arg(long, env = "SSEUDAM_DISPLAY_URL")]
    display_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::load(args.config.as_deref()).context("Failed to load config")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(url) = args.display_url.clone() {
        config.delivery.display_url = url;
    }

    // Initialize tracing
    let default_filter = format!(
        "sseudam_ar={level},sseudam_common={level},tower_http={level}",
        level = config.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting sseudam-ar (Analysis Result) service");
    info!(
        "Version: {} ({}, {} build, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_PROFILE"),
        env!("BUILD_TIMESTAMP")
    );

    // Root folder: CLI, then SSEUDAM_ROOT_FOLDER, then config, then OS default
    let root_folder = resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV, &config);
    let db_path = database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let db = sseudam_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;
    info!("Database connection established");

    let signing_secret = sseudam_common::api::load_signing_secret(&db)
        .await
        .context("Failed to load token signing secret")?;

    if config.delivery.display_url.is_empty() {
        warn!("No display URL configured, hardware delivery disabled");
    } else {
        info!("Display device: {}", config.delivery.display_url);
    }
    info!(
        "Scoring: category {} accepting {:?}",
        config.scoring.target_category, config.scoring.accepted_classes
    );

    let state = AppState::from_config(db, &signing_secret, &config)
        .context("Failed to build application state")?;
    let app = sseudam_ar::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.bind_host, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_host, config.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
