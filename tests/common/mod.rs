//! Common test utilities for all integration tests.
//!
//! Provides an in-memory Connect double, a counting client factory and
//! helpers to build a configured backend.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Map, Value};

use op_connect_plugin::backend::{Backend, Operation, Request, Response};
use op_connect_plugin::config::PluginSettings;
use op_connect_plugin::connect::{ClientFactory, ConnectClient, ConnectError, Item, Vault};
use op_connect_plugin::storage::InMemoryStorage;
use op_connect_plugin::Result;

pub const TEST_HOST: &str = "localhost:8080";
pub const TEST_TOKEN: &str = "test-connect-token";

/// Build a 26 character `[a-z0-9]` ID.
pub fn canonical_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..26].to_string()
}

pub fn timestamp(offset_secs: i64) -> DateTime<Utc> {
    let base = Utc.with_ymd_and_hms(2021, 4, 10, 17, 20, 5).single().unwrap_or_default();
    base + Duration::seconds(offset_secs)
}

#[derive(Default)]
struct MockState {
    vaults: Vec<Vault>,
    items: HashMap<String, Vec<Item>>,
    clock: i64,
}

/// In-memory stand-in for a Connect server.
#[derive(Default)]
pub struct MockConnectClient {
    state: Mutex<MockState>,
    calls: Mutex<Vec<String>>,
    unavailable: Mutex<bool>,
}

impl MockConnectClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record(&self, call: impl Into<String>) -> std::result::Result<(), ConnectError> {
        self.calls.lock().unwrap().push(call.into());
        if *self.unavailable.lock().unwrap() {
            return Err(ConnectError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    fn tick(state: &mut MockState) -> DateTime<Utc> {
        state.clock += 60;
        timestamp(state.clock)
    }

    /// Make every call fail with a transport error.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn add_vault(&self, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let created_at = Self::tick(&mut state);
        self.add_vault_locked(&mut state, name, created_at)
    }

    pub fn add_vault_at(&self, name: &str, created_at: DateTime<Utc>) -> String {
        let mut state = self.state.lock().unwrap();
        self.add_vault_locked(&mut state, name, created_at)
    }

    fn add_vault_locked(&self, state: &mut MockState, name: &str, created_at: DateTime<Utc>) -> String {
        let id = canonical_id();
        state.vaults.push(Vault {
            id: id.clone(),
            name: name.to_string(),
            description: None,
            created_at,
            updated_at: created_at,
        });
        state.items.entry(id.clone()).or_default();
        id
    }

    /// Insert an item directly, bypassing the create call log.
    pub fn add_item_at(&self, vault_id: &str, title: &str, created_at: DateTime<Utc>) -> String {
        let mut state = self.state.lock().unwrap();
        let id = canonical_id();
        let mut item = Item { id: id.clone(), title: title.to_string(), ..Item::default() };
        item.vault.id = vault_id.to_string();
        item.created_at = created_at;
        item.updated_at = created_at;
        state.items.entry(vault_id.to_string()).or_default().push(item);
        id
    }

    pub fn item(&self, vault_id: &str, item_id: &str) -> Option<Item> {
        let state = self.state.lock().unwrap();
        state.items.get(vault_id)?.iter().find(|i| i.id == item_id).cloned()
    }

    pub fn item_count(&self, vault_id: &str) -> usize {
        self.state.lock().unwrap().items.get(vault_id).map(Vec::len).unwrap_or(0)
    }
}

#[async_trait]
impl ConnectClient for MockConnectClient {
    async fn get_vaults(&self) -> std::result::Result<Vec<Vault>, ConnectError> {
        self.record("get_vaults")?;
        Ok(self.state.lock().unwrap().vaults.clone())
    }

    async fn get_vaults_by_title(&self, title: &str) -> std::result::Result<Vec<Vault>, ConnectError> {
        self.record(format!("get_vaults_by_title:{}", title))?;
        let state = self.state.lock().unwrap();
        Ok(state.vaults.iter().filter(|v| v.name == title).cloned().collect())
    }

    async fn get_items(&self, vault_id: &str) -> std::result::Result<Vec<Item>, ConnectError> {
        self.record(format!("get_items:{}", vault_id))?;
        let state = self.state.lock().unwrap();
        state
            .items
            .get(vault_id)
            .cloned()
            .ok_or_else(|| ConnectError::not_found(format!("vault {} not found", vault_id)))
    }

    async fn get_items_by_title(
        &self,
        title: &str,
        vault_id: &str,
    ) -> std::result::Result<Vec<Item>, ConnectError> {
        self.record(format!("get_items_by_title:{}", title))?;
        let state = self.state.lock().unwrap();
        let items = state
            .items
            .get(vault_id)
            .ok_or_else(|| ConnectError::not_found(format!("vault {} not found", vault_id)))?;
        Ok(items.iter().filter(|i| i.title == title).cloned().collect())
    }

    async fn get_item(&self, item_id: &str, vault_id: &str) -> std::result::Result<Item, ConnectError> {
        self.record(format!("get_item:{}", item_id))?;
        self.item(vault_id, item_id)
            .ok_or_else(|| ConnectError::not_found(format!("item {} not found", item_id)))
    }

    async fn create_item(&self, item: &Item, vault_id: &str) -> std::result::Result<Item, ConnectError> {
        self.record("create_item")?;
        let mut state = self.state.lock().unwrap();
        let created_at = Self::tick(&mut state);
        let items = state
            .items
            .get_mut(vault_id)
            .ok_or_else(|| ConnectError::not_found(format!("vault {} not found", vault_id)))?;

        let mut created = item.clone();
        created.id = canonical_id();
        created.vault.id = vault_id.to_string();
        created.created_at = created_at;
        created.updated_at = created_at;
        created.version = 1;
        items.push(created.clone());
        Ok(created)
    }

    async fn update_item(&self, item: &Item, vault_id: &str) -> std::result::Result<Item, ConnectError> {
        self.record(format!("update_item:{}", item.id))?;
        let mut state = self.state.lock().unwrap();
        let updated_at = Self::tick(&mut state);
        let existing = state
            .items
            .get_mut(vault_id)
            .and_then(|items| items.iter_mut().find(|i| i.id == item.id))
            .ok_or_else(|| ConnectError::not_found(format!("item {} not found", item.id)))?;

        let created_at = existing.created_at;
        let version = existing.version;
        *existing = item.clone();
        existing.vault.id = vault_id.to_string();
        existing.created_at = created_at;
        existing.updated_at = updated_at;
        existing.version = version + 1;
        Ok(existing.clone())
    }

    async fn delete_item(&self, item: &Item, vault_id: &str) -> std::result::Result<(), ConnectError> {
        self.record(format!("delete_item:{}", item.id))?;
        let mut state = self.state.lock().unwrap();
        let items = state
            .items
            .get_mut(vault_id)
            .ok_or_else(|| ConnectError::not_found(format!("vault {} not found", vault_id)))?;
        let before = items.len();
        items.retain(|i| i.id != item.id);
        if items.len() == before {
            return Err(ConnectError::not_found(format!("item {} not found", item.id)));
        }
        Ok(())
    }
}

/// Factory that hands out one shared mock client and counts builds.
pub struct MockClientFactory {
    client: Arc<MockConnectClient>,
    builds: AtomicUsize,
    last: Mutex<Option<(String, String)>>,
}

impl MockClientFactory {
    pub fn new(client: Arc<MockConnectClient>) -> Arc<Self> {
        Arc::new(Self { client, builds: AtomicUsize::new(0), last: Mutex::new(None) })
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// Host and token passed to the most recent build.
    pub fn last_build(&self) -> Option<(String, String)> {
        self.last.lock().unwrap().clone()
    }
}

impl ClientFactory for MockClientFactory {
    fn build(&self, host: &str, token: &str) -> std::result::Result<Arc<dyn ConnectClient>, ConnectError> {
        if host.is_empty() {
            return Err(ConnectError::InvalidConfig("Connect host is empty".to_string()));
        }
        self.builds.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((host.to_string(), token.to_string()));
        Ok(self.client.clone())
    }
}

/// A backend wired to the mock client with its own storage.
pub struct TestHarness {
    pub backend: Backend,
    pub storage: InMemoryStorage,
    pub client: Arc<MockConnectClient>,
    pub factory: Arc<MockClientFactory>,
    pub env: Arc<Mutex<HashMap<String, String>>>,
}

impl TestHarness {
    /// Backend with no stored configuration.
    pub fn unconfigured() -> Self {
        let client = MockConnectClient::new();
        let factory = MockClientFactory::new(client.clone());
        let env: Arc<Mutex<HashMap<String, String>>> = Arc::new(Mutex::new(HashMap::new()));
        let lookup_env = env.clone();

        let backend = Backend::new(&PluginSettings::default(), factory.clone())
            .with_env_lookup(Arc::new(move |name: &str| lookup_env.lock().unwrap().get(name).cloned()));

        Self { backend, storage: InMemoryStorage::new(), client, factory, env }
    }

    /// Backend configured with host, token and no default vault.
    pub async fn configured() -> Self {
        let harness = Self::unconfigured();
        harness
            .write_config(serde_json::json!({
                "op_connect_host": TEST_HOST,
                "op_connect_token": TEST_TOKEN,
            }))
            .await
            .unwrap();
        harness
    }

    pub fn set_env(&self, name: &str, value: &str) {
        self.env.lock().unwrap().insert(name.to_string(), value.to_string());
    }

    pub async fn request(
        &self,
        operation: Operation,
        path: &str,
        data: Value,
    ) -> Result<Option<Response>> {
        let request = Request::new(operation, path).with_data(object(data));
        self.backend.handle_request(&self.storage, request).await
    }

    pub async fn write_config(&self, data: Value) -> Result<Option<Response>> {
        self.request(Operation::Update, "config", data).await
    }
}

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Unwrap a data response into its field map.
pub fn data_of(response: Option<Response>) -> Map<String, Value> {
    match response {
        Some(Response::Data(data)) => data,
        other => panic!("expected data response, got {:?}", other),
    }
}

/// Unwrap a list response into `(keys, key_info)`.
pub fn list_of(response: Option<Response>) -> (Vec<String>, Map<String, Value>) {
    match response {
        Some(Response::List { keys, key_info }) => (keys, key_info),
        other => panic!("expected list response, got {:?}", other),
    }
}
