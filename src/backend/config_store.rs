//! Persisted connection configuration and the `config` path handlers.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::cache::CacheKey;
use super::{Backend, Response};
use crate::errors::{PluginError, Result};
use crate::storage::{Storage, StorageEntry};

/// Storage key the configuration record lives under.
pub const CONFIG_KEY: &str = "config";

/// Connection settings for the Connect server, stored as a single JSON record.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectConfig {
    #[serde(rename = "op_connect_token", default)]
    pub api_token: String,

    #[serde(rename = "op_connect_host", default)]
    pub api_host: String,

    #[serde(rename = "op_vault", default)]
    pub default_vault_id: String,
}

impl fmt::Debug for ConnectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectConfig")
            .field("api_token", &"[REDACTED]")
            .field("api_host", &self.api_host)
            .field("default_vault_id", &self.default_vault_id)
            .finish()
    }
}

/// Partial update of the configuration record. Absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub api_token: Option<String>,
    pub api_host: Option<String>,
    pub default_vault_id: Option<String>,
}

impl ConfigUpdate {
    /// Extract the update from request data.
    ///
    /// A key that is present counts as supplied, even with an empty value;
    /// non-string values are rejected.
    pub fn from_data(data: &Map<String, Value>) -> Result<Self> {
        fn field(data: &Map<String, Value>, name: &str) -> Result<Option<String>> {
            match data.get(name) {
                None => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(Value::Null) => Ok(Some(String::new())),
                Some(_) => Err(PluginError::validation(name, "expected a string")),
            }
        }

        Ok(Self {
            api_token: field(data, "op_connect_token")?,
            api_host: field(data, "op_connect_host")?,
            default_vault_id: field(data, "op_vault")?,
        })
    }

    fn touches_client(&self) -> bool {
        self.api_token.is_some() || self.api_host.is_some()
    }

    fn apply(self, config: &mut ConnectConfig) {
        if let Some(token) = self.api_token {
            config.api_token = token;
        }
        if let Some(host) = self.api_host {
            config.api_host = host;
        }
        if let Some(vault) = self.default_vault_id {
            config.default_vault_id = vault;
        }
    }
}

/// Read the configuration record, if one has been written.
pub async fn get_config(storage: &dyn Storage) -> Result<Option<ConnectConfig>> {
    let entry = storage
        .get(CONFIG_KEY)
        .await
        .map_err(|e| PluginError::storage("failed to read config", e))?;

    match entry {
        None => Ok(None),
        Some(entry) => entry
            .decode_json::<ConnectConfig>()
            .map(Some)
            .map_err(|e| PluginError::serialization("failed to decode config", e)),
    }
}

/// Write the configuration record, replacing the previous one.
pub async fn put_config(storage: &dyn Storage, config: &ConnectConfig) -> Result<()> {
    let entry = StorageEntry::json(CONFIG_KEY, config)
        .map_err(|e| PluginError::serialization("failed to encode config", e))?;
    storage.put(entry).await.map_err(|e| PluginError::storage("failed to write config", e))
}

impl Backend {
    pub(crate) async fn handle_config_read(&self, storage: &dyn Storage) -> Result<Option<Response>> {
        let Some(config) = get_config(storage).await? else {
            return Ok(None);
        };

        let mut data = Map::new();
        data.insert("op_connect_host".to_string(), Value::String(config.api_host));
        data.insert("op_vault".to_string(), Value::String(config.default_vault_id));
        data.insert("op_connect_token".to_string(), Value::String(config.api_token));
        Ok(Some(Response::Data(data)))
    }

    pub(crate) async fn handle_config_write(
        &self,
        storage: &dyn Storage,
        data: &Map<String, Value>,
    ) -> Result<Option<Response>> {
        let update = ConfigUpdate::from_data(data)?;
        let mut config = get_config(storage).await?.unwrap_or_default();

        let token_changed = update.api_token.is_some();
        let host_changed = update.api_host.is_some();
        let vault_changed = update.default_vault_id.is_some();
        let client_changed = update.touches_client();

        // a client built from the old record while the put is in flight is
        // dropped by the second eviction
        self.evict_changed(client_changed, vault_changed);
        update.apply(&mut config);
        put_config(storage, &config).await?;
        self.evict_changed(client_changed, vault_changed);

        info!(
            host_changed,
            token_changed,
            vault_changed,
            host = %config.api_host,
            "Updated Connect configuration"
        );
        debug!(config = ?config, "Stored Connect configuration");

        Ok(None)
    }

    fn evict_changed(&self, client: bool, default_vault: bool) {
        if client {
            self.cache.delete(CacheKey::Client);
        }
        if default_vault {
            self.cache.delete(CacheKey::DefaultVault);
        }
    }
}
