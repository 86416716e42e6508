//! # Plugin Backend
//!
//! Request handling for the 1Password Connect plugin. A host hands the
//! backend an [`Operation`], a path, a flat field map and a [`Storage`]
//! handle; the backend answers with an optional [`Response`].
//!
//! | Path | Operations |
//! |------|------------|
//! | `config` | read, create, update |
//! | `vaults` | list |
//! | `vaults/{vault}/items` | list, create |
//! | `vaults/{vault}/items/{id}` | read, create, update, delete |
//!
//! `{vault}` and `{id}` accept either canonical IDs or titles.
//!
//! The backend owns a [`ClientCache`] holding the Connect client built from
//! the stored configuration and the default vault. Configuration writes
//! evict the affected entries so later requests see the new settings.

pub mod cache;
pub mod config_store;
pub mod default_vault;
pub mod fields;
pub mod items;
pub mod paths;
pub mod resolver;
pub mod vaults;

pub use cache::{CacheKey, CachedValue, ClientCache, Expiration};
pub use config_store::{get_config, put_config, ConfigUpdate, ConnectConfig, CONFIG_KEY};
pub use paths::Route;
pub use resolver::{is_canonical_id, resolve_item_id, resolve_vault_id};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, Instrument};

use crate::config::PluginSettings;
use crate::connect::{ClientFactory, ConnectClient};
use crate::errors::{PluginError, Result};
use crate::storage::Storage;

/// Looks up an environment variable by name.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Operations a host can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
    List,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::List => "list",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "read" => Ok(Operation::Read),
            "create" => Ok(Operation::Create),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            "list" => Ok(Operation::List),
            other => Err(PluginError::validation("operation", format!("unknown operation '{}'", other))),
        }
    }
}

/// A host request
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub operation: Operation,
    pub path: String,
    pub data: Map<String, Value>,
}

impl Request {
    pub fn new(operation: Operation, path: impl Into<String>) -> Self {
        Self { operation, path: path.into(), data: Map::new() }
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }
}

/// A successful response
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Flat field map
    Data(Map<String, Value>),
    /// Ordered display keys plus a map from each key to its bare ID
    List { keys: Vec<String>, key_info: Map<String, Value> },
}

impl Response {
    /// Build a list response from `(title, id)` pairs, keyed `"<title> <id>"`.
    pub fn list<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut keys = Vec::new();
        let mut key_info = Map::new();
        for (title, id) in entries {
            let key = format!("{} {}", title, id);
            key_info.insert(key.clone(), Value::String(id));
            keys.push(key);
        }
        Response::List { keys, key_info }
    }

    pub fn into_json(self) -> Value {
        match self {
            Response::Data(data) => Value::Object(data),
            Response::List { keys, key_info } => {
                let mut body = Map::new();
                body.insert("keys".to_string(), Value::from(keys));
                body.insert("key_info".to_string(), Value::Object(key_info));
                Value::Object(body)
            }
        }
    }
}

/// The plugin backend
pub struct Backend {
    cache: ClientCache,
    factory: Arc<dyn ClientFactory>,
    default_vault_var: String,
    env_lookup: EnvLookup,
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("cache", &self.cache)
            .field("default_vault_var", &self.default_vault_var)
            .finish()
    }
}

impl Backend {
    /// Create a backend that reads the default vault override from the
    /// process environment.
    pub fn new(settings: &PluginSettings, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            cache: ClientCache::new(settings.cache.expiration(), settings.cache.cleanup_interval()),
            factory,
            default_vault_var: settings.connect.default_vault_var.clone(),
            env_lookup: Arc::new(|name: &str| std::env::var(name).ok()),
        }
    }

    /// Replace the environment lookup used for the default vault override.
    pub fn with_env_lookup(mut self, lookup: EnvLookup) -> Self {
        self.env_lookup = lookup;
        self
    }

    pub fn cache(&self) -> &ClientCache {
        &self.cache
    }

    /// Start background work. Call once after construction.
    pub fn setup(&self) {
        self.cache.start_sweeper();
    }

    /// Stop background work and drop every cached entry.
    pub fn cleanup(&self) {
        self.cache.stop_sweeper();
        self.cache.clear();
    }

    /// Return the Connect client, building it from the stored configuration
    /// on a cache miss.
    pub async fn client(&self, storage: &dyn Storage) -> Result<Arc<dyn ConnectClient>> {
        if let Some(client) = self.cache.client() {
            debug!("Using cached client");
            return Ok(client);
        }

        debug!("Creating new client");
        let config = get_config(storage).await?.ok_or(PluginError::NotConfigured)?;
        let client = self
            .factory
            .build(&config.api_host, &config.api_token)
            .map_err(|e| PluginError::upstream("unable to build client", e))?;

        self.cache.set(CacheKey::Client, CachedValue::Client(client.clone()), Expiration::Never);
        Ok(client)
    }

    /// Whether a storage entry exists at `path`.
    ///
    /// Hosts use this to choose between create and update. It says nothing
    /// about the state of the Connect server.
    pub async fn existence_check(&self, storage: &dyn Storage, path: &str) -> Result<bool> {
        let key = path.trim_start_matches('/');
        let entry = storage
            .get(key)
            .await
            .map_err(|e| PluginError::storage("existence check failed", e))?;
        Ok(entry.is_some())
    }

    /// Route and handle a request.
    pub async fn handle_request(&self, storage: &dyn Storage, request: Request) -> Result<Option<Response>> {
        let span = crate::operation_span!(request.operation, request.path);
        self.dispatch(storage, request).instrument(span).await
    }

    async fn dispatch(&self, storage: &dyn Storage, request: Request) -> Result<Option<Response>> {
        let Request { operation, path, mut data } = request;
        let route = Route::parse(&path)?;

        for (name, value) in route.captures() {
            data.insert(name.to_string(), Value::String(value.to_string()));
        }

        match (&route, operation) {
            (Route::Config, Operation::Read) => self.handle_config_read(storage).await,
            (Route::Config, Operation::Create | Operation::Update) => {
                self.handle_config_write(storage, &data).await
            }
            (Route::Vaults, Operation::List) => self.handle_list_vaults(storage).await,
            (Route::Items { .. }, Operation::List) => self.handle_list_items(storage, &data).await,
            (Route::Items { .. }, Operation::Create) => self.handle_create_item(storage, &data).await,
            (Route::Item { .. }, Operation::Read) => self.handle_read_item(storage, &data).await,
            (Route::Item { .. }, Operation::Create | Operation::Update) => {
                self.handle_update_item(storage, &data).await
            }
            (Route::Item { .. }, Operation::Delete) => self.handle_delete_item(storage, &data).await,
            _ => Err(PluginError::UnsupportedOperation { operation: operation.to_string(), path }),
        }
    }
}

/// String field from request data; missing or null reads as empty.
pub(crate) fn optional_str(data: &Map<String, Value>, name: &str) -> Result<String> {
    match data.get(name) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(PluginError::validation(name, "expected a string")),
    }
}

/// String field from request data that must be present and non-empty.
pub(crate) fn required_str(data: &Map<String, Value>, name: &str) -> Result<String> {
    let value = optional_str(data, name)?;
    if value.is_empty() {
        return Err(PluginError::validation(name, "is required"));
    }
    Ok(value)
}
