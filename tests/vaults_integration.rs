//! Integration tests for vault listing and vault title resolution.

mod common;

use common::{list_of, timestamp, TestHarness};
use op_connect_plugin::backend::{resolve_vault_id, Operation};
use op_connect_plugin::PluginError;
use serde_json::json;

#[tokio::test]
async fn list_vaults_uses_composite_keys() {
    let harness = TestHarness::configured().await;
    let dev = harness.client.add_vault("Dev");
    let ops = harness.client.add_vault("Ops Team");

    let (keys, key_info) =
        list_of(harness.request(Operation::List, "vaults", json!({})).await.unwrap());

    assert_eq!(keys, vec![format!("Dev {}", dev), format!("Ops Team {}", ops)]);
    assert_eq!(key_info.len(), 2);
    assert_eq!(key_info[&format!("Ops Team {}", ops)], ops.as_str());
}

#[tokio::test]
async fn list_vaults_with_trailing_slash() {
    let harness = TestHarness::configured().await;
    harness.client.add_vault("Dev");
    let (keys, _) = list_of(harness.request(Operation::List, "vaults/", json!({})).await.unwrap());
    assert_eq!(keys.len(), 1);
}

#[tokio::test]
async fn empty_vault_list() {
    let harness = TestHarness::configured().await;
    let (keys, key_info) =
        list_of(harness.request(Operation::List, "vaults", json!({})).await.unwrap());
    assert!(keys.is_empty());
    assert!(key_info.is_empty());
}

#[tokio::test]
async fn list_vaults_upstream_failure() {
    let harness = TestHarness::configured().await;
    harness.client.set_unavailable(true);

    let err = harness.request(Operation::List, "vaults", json!({})).await.unwrap_err();
    assert!(matches!(err, PluginError::Upstream { .. }));
    assert!(err.to_string().starts_with("unable to list vaults: "));
}

#[tokio::test]
async fn read_on_vaults_is_unsupported() {
    let harness = TestHarness::configured().await;
    let err = harness.request(Operation::Read, "vaults", json!({})).await.unwrap_err();
    assert!(matches!(err, PluginError::UnsupportedOperation { .. }));
}

#[tokio::test]
async fn duplicate_vault_names_resolve_to_oldest() {
    let harness = TestHarness::configured().await;
    let _newer = harness.client.add_vault_at("Shared", timestamp(1_000));
    let older = harness.client.add_vault_at("Shared", timestamp(10));

    let client = harness.backend.client(&harness.storage).await.unwrap();
    let resolved = resolve_vault_id(client.as_ref(), "Shared").await.unwrap();
    assert_eq!(resolved, older);
}

#[tokio::test]
async fn equal_timestamps_keep_upstream_order() {
    let harness = TestHarness::configured().await;
    let first = harness.client.add_vault_at("Twin", timestamp(10));
    let _second = harness.client.add_vault_at("Twin", timestamp(10));

    let client = harness.backend.client(&harness.storage).await.unwrap();
    assert_eq!(resolve_vault_id(client.as_ref(), "Twin").await.unwrap(), first);
}
