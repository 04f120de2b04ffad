//! playlist-api - Main entry point
//!
//! In-memory playlist REST service. All state lives for the lifetime of the
//! process; nothing is persisted across restarts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use playlist_common::config::{resolve_config_path, CliOverrides, ServiceConfig, TomlConfig};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playlist_api::{build_router, AppState, Store};

/// Command-line arguments for playlist-api
#[derive(Parser, Debug)]
#[command(name = "playlist-api")]
#[command(about = "In-memory playlist REST service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Start with an empty store instead of the demo playlist
    #[arg(long)]
    no_seed: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            host: self.host.clone(),
            port: self.port,
            log_level: self.log_level.clone(),
            seed_demo_data: self.no_seed.then_some(false),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let toml = TomlConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config file {}", config_path.display()))?;
    let config = ServiceConfig::resolve(args.overrides(), toml).context("Invalid configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("playlist_api={0},tower_http={0}", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting playlist-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if config_path.exists() {
        info!("Configuration file: {}", config_path.display());
    } else {
        warn!(
            "Config file {} not found, using built-in defaults",
            config_path.display()
        );
    }

    let store = if config.seed_demo_data {
        info!("Seeding demo playlist");
        Store::with_demo_data()
    } else {
        Store::new()
    };

    let app = build_router(AppState::new(store));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Playlist API listening on http://{}", addr);
    info!("Health check: http://{}/api/health", addr);

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
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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
