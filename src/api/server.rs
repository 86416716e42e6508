use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::errors::{PluginError, Result};

use super::routes::{build_router, ApiState};

/// Serve the HTTP adapter until `shutdown` resolves.
pub async fn start_api_server<F>(config: &ServerConfig, state: ApiState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| PluginError::config(format!("Invalid API address: {}", e)))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| PluginError::internal(format!("Failed to bind API server: {}", e)))?;

    info!(address = %addr, "Starting HTTP API server");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| PluginError::internal(format!("API server error: {}", e)))?;

    info!("API server shutdown completed");
    Ok(())
}
