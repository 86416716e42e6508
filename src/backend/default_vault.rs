//! Default vault selection.

use tracing::debug;

use super::cache::{CacheKey, CachedValue, Expiration};
use super::config_store::get_config;
use super::Backend;
use crate::errors::{PluginError, Result};
use crate::storage::Storage;

impl Backend {
    /// Pick the vault a request operates on.
    ///
    /// Precedence: a non-empty `explicit` value, then the environment
    /// override, then the cached default, then the stored configuration.
    /// An override variable that is set but empty counts as unset. A stored
    /// record that cannot be read is reported, not treated as absent.
    pub async fn resolve_default_vault(&self, storage: &dyn Storage, explicit: &str) -> Result<String> {
        if !explicit.is_empty() {
            return Ok(explicit.to_string());
        }

        if let Some(vault) = (self.env_lookup)(&self.default_vault_var).filter(|v| !v.is_empty()) {
            debug!(variable = %self.default_vault_var, "Using default vault from environment");
            return Ok(vault);
        }

        if let Some(vault) = self.cache.default_vault() {
            debug!("Using cached default vault");
            return Ok(vault);
        }

        match get_config(storage).await? {
            Some(config) if !config.default_vault_id.is_empty() => {
                self.cache.set(
                    CacheKey::DefaultVault,
                    CachedValue::DefaultVault(config.default_vault_id.clone()),
                    Expiration::Never,
                );
                Ok(config.default_vault_id)
            }
            _ => Err(PluginError::NoVaultSpecified),
        }
    }
}
