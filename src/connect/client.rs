//! Connect client capability trait and factory.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::Result;
use super::models::{Item, Vault};

/// Operations the plugin needs from the 1Password Connect API.
///
/// Both [`super::HttpConnectClient`] and test doubles implement this trait;
/// the backend only ever talks to upstream through it.
///
/// # Errors
///
/// Implementations report a missing vault or item as
/// [`super::ConnectError::NotFound`] so callers can tell "no such entity"
/// apart from transport and authorization failures.
#[async_trait]
pub trait ConnectClient: Send + Sync {
    /// List every vault the token can see.
    async fn get_vaults(&self) -> Result<Vec<Vault>>;

    /// List the vaults whose name equals `title`.
    async fn get_vaults_by_title(&self, title: &str) -> Result<Vec<Vault>>;

    /// List the items (overviews, without field values) in a vault.
    async fn get_items(&self, vault_id: &str) -> Result<Vec<Item>>;

    /// List the items in a vault whose title equals `title`.
    async fn get_items_by_title(&self, title: &str, vault_id: &str) -> Result<Vec<Item>>;

    /// Fetch a full item, including its fields.
    async fn get_item(&self, item_id: &str, vault_id: &str) -> Result<Item>;

    /// Create an item; the service allocates its ID.
    async fn create_item(&self, item: &Item, vault_id: &str) -> Result<Item>;

    /// Replace an existing item, addressed by `item.id`.
    async fn update_item(&self, item: &Item, vault_id: &str) -> Result<Item>;

    /// Delete the item addressed by `item.id`.
    async fn delete_item(&self, item: &Item, vault_id: &str) -> Result<()>;
}

impl std::fmt::Debug for dyn ConnectClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConnectClient")
    }
}

/// Builds client handles from persisted connection settings.
///
/// Construction must be a pure function of `(host, token)`: the client cache
/// relies on two concurrently built handles behaving identically.
pub trait ClientFactory: Send + Sync {
    fn build(&self, host: &str, token: &str) -> Result<Arc<dyn ConnectClient>>;
}
