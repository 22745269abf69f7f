//! BeTus server binary.

use anyhow::{Context, Result};
use betus_core::config::AppConfig;
use betus_files::FilesManager;
use betus_server::{AppState, create_router};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// BeTus - a tus 1.0.0 resumable upload server
#[derive(Parser, Debug)]
#[command(name = "betusd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "BETUS_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("BeTus v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file is optional, env vars can provide/override everything)
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    if config_path.exists() {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}, using defaults", args.config);
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("BETUS_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    // Register Prometheus metrics
    betus_server::metrics::register_metrics();

    // Initialize upload storage
    let files = Arc::new(
        FilesManager::new(&config.storage.path)
            .await
            .context("failed to initialize upload storage")?,
    );
    tracing::info!(path = %config.storage.path.display(), "Upload storage initialized");

    let state = AppState::new(config.clone(), files.clone());
    let app = create_router(state);

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to install shutdown handler");
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    // The registry lives in memory only, so uploads cannot be resumed across
    // a restart; clear the directory rather than leave orphaned pairs.
    let removed = files.delete_all();
    tracing::info!(removed, "Upload directory cleared");

    Ok(())
}
