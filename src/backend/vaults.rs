//! Vault listing.

use super::{Backend, Response};
use crate::errors::{PluginError, Result};
use crate::storage::Storage;

impl Backend {
    pub(crate) async fn handle_list_vaults(&self, storage: &dyn Storage) -> Result<Option<Response>> {
        let client = self.client(storage).await?;
        let vaults = client
            .get_vaults()
            .await
            .map_err(|e| PluginError::upstream("unable to list vaults", e))?;

        Ok(Some(Response::list(vaults.into_iter().map(|vault| (vault.name, vault.id)))))
    }
}
