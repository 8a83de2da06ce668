//! rackplan daemon
//!
//! Serves the rack inventory and placement suggestion API.

use anyhow::Context;
use clap::Parser;
use rackplan_api::create_app;
use rackplan_core::{DaemonConfig, LogFormat};
use rackplan_store::Inventory;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// rackplan daemon - rack inventory with capacity-aware placement suggestions
#[derive(Parser, Debug)]
#[command(name = "rackpland")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind the API server
    #[arg(long)]
    address: Option<String>,

    /// Port for the REST API server
    #[arg(long)]
    port: Option<u16>,

    /// JSON snapshot file for the inventory
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Insert demo racks and devices into an empty inventory
    #[arg(long)]
    seed: bool,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<DaemonConfig> {
        let mut config = match &self.config {
            Some(path) => DaemonConfig::from_file(path)?,
            None => DaemonConfig::default(),
        };

        if let Some(address) = self.address {
            config.api.address = address;
        }
        if let Some(port) = self.port {
            config.api.port = port;
        }
        if let Some(snapshot) = self.snapshot {
            config.storage.snapshot_path = Some(snapshot);
        }
        if self.seed {
            config.storage.seed_demo_data = true;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        Ok(config)
    }
}

fn init_logging(config: &DaemonConfig) -> anyhow::Result<()> {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    match config.logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Args::parse().into_config()?;
    init_logging(&config)?;

    info!("Starting rackplan daemon v{}", env!("CARGO_PKG_VERSION"));

    let inventory = match &config.storage.snapshot_path {
        Some(path) => Inventory::open(path.clone())
            .await
            .with_context(|| format!("Failed to open inventory at {}", path.display()))?,
        None => {
            info!("No snapshot configured, inventory is memory-only");
            Inventory::new()
        }
    };
    if config.storage.seed_demo_data {
        inventory.seed_demo_data().await?;
    }

    let router = create_app(Arc::new(inventory), &config.api);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid address {}", config.bind_address()))?;

    info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
