use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use op_connect_plugin::{
    api::{start_api_server, ApiState},
    backend::Backend,
    config::PluginSettings,
    connect::HttpClientFactory,
    observability::{init_logging, log_config_info},
    storage::{FileStorage, InMemoryStorage, Storage},
    APP_NAME, VERSION,
};
use tokio::signal;
use tracing::{info, warn};

/// Serve the 1Password Connect plugin over HTTP
#[derive(Debug, Parser)]
#[command(name = "op-connect-plugin", version, about)]
struct Cli {
    /// Bind address (overrides OP_PLUGIN_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides OP_PLUGIN_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Directory for persisted configuration (overrides OP_PLUGIN_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for CTRL+C; shutting down");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (optional - won't fail if missing)
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();
    let mut settings = PluginSettings::from_env().context("Failed to load settings")?;
    if let Some(host) = cli.host {
        settings.server.host = host;
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    if let Some(dir) = cli.data_dir {
        settings.storage.data_dir = Some(dir);
    }
    settings.validate().context("Invalid settings")?;

    init_logging(&settings.observability).context("Failed to initialize logging")?;
    info!(app_name = APP_NAME, version = VERSION, "Starting 1Password Connect plugin");
    log_config_info(&settings);

    let storage: Arc<dyn Storage> = match &settings.storage.data_dir {
        Some(dir) => Arc::new(
            FileStorage::open(dir)
                .await
                .with_context(|| format!("Failed to open storage at {}", dir.display()))?,
        ),
        None => {
            warn!("No data directory configured; configuration will not survive restarts");
            Arc::new(InMemoryStorage::new())
        }
    };

    let factory = Arc::new(HttpClientFactory::new(settings.connect.timeout()));
    let backend = Arc::new(Backend::new(&settings, factory));
    backend.setup();

    let state = ApiState::new(backend.clone(), storage);
    let result = start_api_server(&settings.server, state, shutdown_signal()).await;

    backend.cleanup();
    result.context("API server failed")?;
    info!("Plugin shutdown completed");
    Ok(())
}
