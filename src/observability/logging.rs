//! # Structured Logging
//!
//! Subscriber setup and span macros for the plugin host.
//!
//! `RUST_LOG`, when set, overrides the configured level. In JSON mode each
//! event carries the fields of its enclosing spans, so every log line emitted
//! while handling a request includes that request's `request_id`.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{ObservabilityConfig, PluginSettings};
use crate::errors::{PluginError, Result};

/// Create a tracing span for a host request.
///
/// ```rust,ignore
/// let span = operation_span!(Operation::Read, "vaults/dev/items/db");
/// let span = operation_span!("list", "vaults", vault = "dev");
/// ```
#[macro_export]
macro_rules! operation_span {
    ($operation:expr, $path:expr) => {
        tracing::info_span!(
            "plugin_request",
            operation = %$operation,
            path = %$path,
            request_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $path:expr, $($field:tt)*) => {
        tracing::info_span!(
            "plugin_request",
            operation = %$operation,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed or the level directive does
/// not parse.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
            PluginError::config(format!("Invalid log level '{}': {}", config.log_level, e))
        })?,
    };

    let builder = fmt().with_env_filter(filter).with_target(true);
    let result = if config.json_logging {
        builder.json().flatten_event(true).with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| PluginError::internal(format!("Failed to install subscriber: {}", e)))
}

/// Log configuration at startup
pub fn log_config_info(settings: &PluginSettings) {
    tracing::info!(
        server_address = %settings.server.bind_address(),
        connect_timeout_seconds = settings.connect.timeout_seconds,
        default_vault_var = %settings.connect.default_vault_var,
        cache_expiration_seconds = settings.cache.expiration_seconds,
        cache_cleanup_seconds = settings.cache.cleanup_interval_seconds,
        storage = %settings
            .storage
            .data_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "memory".to_string()),
        "1Password Connect plugin configuration"
    );
}
