//! # Configuration Settings
//!
//! Process settings for the plugin host: HTTP listener, Connect client,
//! client cache timing, storage location and logging.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{PluginError, Result};

/// Prefix shared by every process setting variable.
pub const ENV_PREFIX: &str = "OP_PLUGIN_";

/// Main plugin configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct PluginSettings {
    /// HTTP adapter configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Connect client configuration
    #[validate(nested)]
    pub connect: ConnectSettings,

    /// Client cache timing
    #[validate(nested)]
    pub cache: CacheSettings,

    /// Storage configuration
    #[validate(nested)]
    pub storage: StorageSettings,

    /// Logging configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl PluginSettings {
    /// Build settings from `OP_PLUGIN_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable source.
    ///
    /// Unset variables fall back to defaults; set but unparsable variables
    /// are reported instead of silently ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, suffix))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let settings = Self {
            server: ServerConfig {
                host: var("HOST").unwrap_or(defaults.server.host),
                port: parse_or("PORT", var("PORT"), defaults.server.port)?,
            },
            connect: ConnectSettings {
                timeout_seconds: parse_or(
                    "CONNECT_TIMEOUT_SECONDS",
                    var("CONNECT_TIMEOUT_SECONDS"),
                    defaults.connect.timeout_seconds,
                )?,
                default_vault_var: var("DEFAULT_VAULT_VAR")
                    .unwrap_or(defaults.connect.default_vault_var),
            },
            cache: CacheSettings {
                expiration_seconds: parse_or(
                    "CACHE_EXPIRATION_SECONDS",
                    var("CACHE_EXPIRATION_SECONDS"),
                    defaults.cache.expiration_seconds,
                )?,
                cleanup_interval_seconds: parse_or(
                    "CACHE_CLEANUP_SECONDS",
                    var("CACHE_CLEANUP_SECONDS"),
                    defaults.cache.cleanup_interval_seconds,
                )?,
            },
            storage: StorageSettings { data_dir: var("DATA_DIR").map(PathBuf::from) },
            observability: ObservabilityConfig {
                log_level: var("LOG_LEVEL").unwrap_or(defaults.observability.log_level),
                json_logging: var("LOG_JSON")
                    .map(|s| s.eq_ignore_ascii_case("true") || s == "1")
                    .unwrap_or(defaults.observability.json_logging),
            },
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(PluginError::from)?;

        if self.cache.cleanup_interval_seconds == 0 {
            return Err(PluginError::validation(
                "cache.cleanup_interval_seconds",
                "Cleanup interval must be greater than zero",
            ));
        }

        Ok(())
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse::<T>().map_err(|e| {
            PluginError::config(format!("Invalid {}{} '{}': {}", ENV_PREFIX, name, value, e))
        }),
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8200 }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Connect client configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConnectSettings {
    /// Upstream request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    /// Environment variable consulted for the default vault override
    #[validate(length(min = 1, message = "Default vault variable cannot be empty"))]
    pub default_vault_var: String,
}

impl Default for ConnectSettings {
    fn default() -> Self {
        Self { timeout_seconds: 30, default_vault_var: "OP_VAULT".to_string() }
    }
}

impl ConnectSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Client cache timing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CacheSettings {
    /// Lifetime of entries stored with the default expiration
    pub expiration_seconds: u64,

    /// How often expired entries are swept
    pub cleanup_interval_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            expiration_seconds: 30 * 60,
            cleanup_interval_seconds: 30 * 60,
        }
    }
}

impl CacheSettings {
    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.expiration_seconds)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_seconds)
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct StorageSettings {
    /// Directory for file-backed storage (None = in-memory)
    pub data_dir: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logging: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config_validation() {
        let config = PluginSettings::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind_address(), "127.0.0.1:8200");
        assert_eq!(config.connect.default_vault_var, "OP_VAULT");
        assert_eq!(config.cache.expiration(), Duration::from_secs(1800));
        assert_eq!(config.cache.cleanup_interval(), Duration::from_secs(1800));
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_from_lookup_reads_prefixed_variables() {
        let config = PluginSettings::from_lookup(lookup(&[
            ("OP_PLUGIN_HOST", "0.0.0.0"),
            ("OP_PLUGIN_PORT", "9000"),
            ("OP_PLUGIN_CONNECT_TIMEOUT_SECONDS", "10"),
            ("OP_PLUGIN_DEFAULT_VAULT_VAR", "MY_VAULT"),
            ("OP_PLUGIN_CACHE_EXPIRATION_SECONDS", "60"),
            ("OP_PLUGIN_CACHE_CLEANUP_SECONDS", "120"),
            ("OP_PLUGIN_DATA_DIR", "/var/lib/op-plugin"),
            ("OP_PLUGIN_LOG_LEVEL", "debug"),
            ("OP_PLUGIN_LOG_JSON", "true"),
        ]))
        .unwrap();

        assert_eq!(config.server.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.connect.timeout(), Duration::from_secs(10));
        assert_eq!(config.connect.default_vault_var, "MY_VAULT");
        assert_eq!(config.cache.expiration_seconds, 60);
        assert_eq!(config.cache.cleanup_interval_seconds, 120);
        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/var/lib/op-plugin")));
        assert_eq!(config.observability.log_level, "debug");
        assert!(config.observability.json_logging);
    }

    #[test]
    fn test_empty_variables_use_defaults() {
        let config =
            PluginSettings::from_lookup(lookup(&[("OP_PLUGIN_PORT", ""), ("OP_PLUGIN_HOST", " ")]))
                .unwrap();
        assert_eq!(config.server.port, 8200);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_unparsable_value_is_config_error() {
        let result = PluginSettings::from_lookup(lookup(&[("OP_PLUGIN_PORT", "eighty")]));
        match result {
            Err(PluginError::Config(message)) => assert!(message.contains("OP_PLUGIN_PORT")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_config_validation_ranges() {
        let result =
            PluginSettings::from_lookup(lookup(&[("OP_PLUGIN_CONNECT_TIMEOUT_SECONDS", "0")]));
        assert!(matches!(result, Err(PluginError::Validation { .. })));

        let result =
            PluginSettings::from_lookup(lookup(&[("OP_PLUGIN_CONNECT_TIMEOUT_SECONDS", "301")]));
        assert!(matches!(result, Err(PluginError::Validation { .. })));

        let mut config = PluginSettings::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = PluginSettings::default();
        config.cache.cleanup_interval_seconds = 0;
        assert!(config.validate().is_err());
    }
}
