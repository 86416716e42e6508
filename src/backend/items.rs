//! Item handlers: read, create, update, delete and list.

use serde_json::{Map, Value};
use tracing::debug;

use super::fields::{decode_fields, decode_sections};
use super::resolver::{resolve_item_id, resolve_vault_id};
use super::{optional_str, required_str, Backend, Response};
use crate::connect::{ConnectClient, Item, ItemCategory, ItemUrl, ItemVault};
use crate::errors::{PluginError, ResourceKind, Result};
use crate::storage::Storage;

impl Backend {
    async fn resolve_vault(
        &self,
        storage: &dyn Storage,
        client: &dyn ConnectClient,
        data: &Map<String, Value>,
    ) -> Result<String> {
        let explicit = optional_str(data, "vault")?;
        let vault = self.resolve_default_vault(storage, &explicit).await?;
        resolve_vault_id(client, &vault).await
    }

    pub(crate) async fn handle_read_item(
        &self,
        storage: &dyn Storage,
        data: &Map<String, Value>,
    ) -> Result<Option<Response>> {
        let client = self.client(storage).await?;
        let identifier = required_str(data, "id")?;
        let vault_id = self.resolve_vault(storage, client.as_ref(), data).await?;
        let item_id = resolve_item_id(client.as_ref(), &identifier, &vault_id).await?;

        let item = client.get_item(&item_id, &vault_id).await.map_err(|e| {
            PluginError::from_lookup("unable to retrieve item", ResourceKind::Item, &identifier, e)
        })?;

        let mut fields = Map::new();
        for field in item.fields {
            fields.insert(field.label, Value::String(field.value.unwrap_or_default()));
        }
        Ok(Some(Response::Data(fields)))
    }

    pub(crate) async fn handle_create_item(
        &self,
        storage: &dyn Storage,
        data: &Map<String, Value>,
    ) -> Result<Option<Response>> {
        let mut item = build_item("", data)?;
        let client = self.client(storage).await?;
        let vault_id = self.resolve_vault(storage, client.as_ref(), data).await?;
        item.vault.id = vault_id.clone();

        let created = client
            .create_item(&item, &vault_id)
            .await
            .map_err(|e| PluginError::upstream("unable to create item", e))?;

        debug!(vault_id = %vault_id, item_id = %created.id, "Created item");
        Ok(Some(item_summary(&created)))
    }

    pub(crate) async fn handle_update_item(
        &self,
        storage: &dyn Storage,
        data: &Map<String, Value>,
    ) -> Result<Option<Response>> {
        let identifier = required_str(data, "id")?;
        let mut item = build_item("", data)?;
        let client = self.client(storage).await?;
        let vault_id = self.resolve_vault(storage, client.as_ref(), data).await?;
        item.vault.id = vault_id.clone();
        item.id = resolve_item_id(client.as_ref(), &identifier, &vault_id).await?;

        let updated = client.update_item(&item, &vault_id).await.map_err(|e| {
            PluginError::from_lookup("unable to update item", ResourceKind::Item, &identifier, e)
        })?;

        debug!(vault_id = %vault_id, item_id = %updated.id, "Updated item");
        Ok(Some(item_summary(&updated)))
    }

    pub(crate) async fn handle_delete_item(
        &self,
        storage: &dyn Storage,
        data: &Map<String, Value>,
    ) -> Result<Option<Response>> {
        let client = self.client(storage).await?;
        let identifier = required_str(data, "id")?;
        let vault_id = self.resolve_vault(storage, client.as_ref(), data).await?;
        let item_id = resolve_item_id(client.as_ref(), &identifier, &vault_id).await?;

        let reference = Item::reference(item_id, vault_id.clone());
        client.delete_item(&reference, &vault_id).await.map_err(|e| {
            PluginError::from_lookup("unable to delete item", ResourceKind::Item, &identifier, e)
        })?;

        debug!(vault_id = %vault_id, item_id = %reference.id, "Deleted item");
        Ok(None)
    }

    pub(crate) async fn handle_list_items(
        &self,
        storage: &dyn Storage,
        data: &Map<String, Value>,
    ) -> Result<Option<Response>> {
        let client = self.client(storage).await?;
        let vault_id = self.resolve_vault(storage, client.as_ref(), data).await?;

        let items = client
            .get_items(&vault_id)
            .await
            .map_err(|e| PluginError::upstream("unable to list items", e))?;

        Ok(Some(Response::list(items.into_iter().map(|item| (item.title, item.id)))))
    }
}

/// Build the item described by a create or update request.
///
/// Every field is taken from the request; nothing is merged with an
/// existing item. Decoding needs no upstream call, so handlers run it
/// before resolving the vault.
pub fn build_item(vault_id: &str, data: &Map<String, Value>) -> Result<Item> {
    let title = optional_str(data, "title")?;
    let url = optional_str(data, "url")?;
    let category = optional_str(data, "category")?;

    let mut item = Item {
        title,
        vault: ItemVault { id: vault_id.to_string() },
        category: ItemCategory::from_request(&category),
        ..Item::default()
    };

    if !url.is_empty() {
        item.urls.push(ItemUrl { primary: true, label: None, href: url });
    }

    item.sections = decode_sections(data.get("sections"))?;
    item.fields = decode_fields(data.get("fields"))?;
    Ok(item)
}

fn item_summary(item: &Item) -> Response {
    let mut data = Map::new();
    data.insert("id".to_string(), Value::String(item.id.clone()));
    data.insert(
        "category".to_string(),
        item.category.map(|c| Value::String(c.as_str().to_string())).unwrap_or(Value::Null),
    );
    data.insert("created_at".to_string(), Value::String(item.created_at.to_rfc3339()));
    Response::Data(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect::FieldType;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_build_item_from_request() {
        let request = data(json!({
            "title": "Prod DB",
            "url": "https://db.example.com",
            "category": "Database",
            "sections": [{"id": "conn", "label": "Connection"}],
            "fields": [{"label": "port", "value": "5432", "section": {"id": "conn"}}]
        }));

        let item = build_item("vaultid", &request).unwrap();
        assert_eq!(item.title, "Prod DB");
        assert_eq!(item.vault.id, "vaultid");
        assert_eq!(item.category, Some(ItemCategory::Database));
        assert_eq!(item.urls, vec![ItemUrl {
            primary: true,
            label: None,
            href: "https://db.example.com".to_string()
        }]);
        assert_eq!(item.sections.len(), 1);
        assert_eq!(item.fields[0].field_type, FieldType::String);
        assert!(item.id.is_empty());
    }

    #[test]
    fn test_unknown_category_is_dropped() {
        let item = build_item("v", &data(json!({"title": "t", "category": "server"}))).unwrap();
        assert!(item.category.is_none());
        assert!(item.urls.is_empty());
    }

    #[test]
    fn test_malformed_field_fails_build() {
        let request = data(json!({"title": "t", "fields": [{"label": "x", "bogus": true}]}));
        assert!(matches!(build_item("v", &request), Err(PluginError::Validation { .. })));
    }

    #[test]
    fn test_item_summary_shape() {
        let item = Item {
            id: "abc".to_string(),
            category: Some(ItemCategory::Login),
            ..Item::default()
        };
        let Response::Data(summary) = item_summary(&item) else {
            panic!("expected data response");
        };
        assert_eq!(summary["id"], "abc");
        assert_eq!(summary["category"], "LOGIN");
        assert!(summary["created_at"].as_str().unwrap().starts_with("1970-01-01T00:00:00"));
    }
}
