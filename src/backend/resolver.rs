//! Resolution of vault and item identifiers to canonical IDs.
//!
//! An identifier is either a canonical Connect ID or a title. Titles are not
//! unique; when several entities share one, the oldest (earliest
//! `created_at`) wins and the ambiguity is logged.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::connect::ConnectClient;
use crate::errors::{PluginError, ResourceKind, Result};

/// Length of a canonical Connect ID.
pub const CANONICAL_ID_LEN: usize = 26;

/// Whether `identifier` has the shape of a canonical Connect ID:
/// exactly 26 characters from `[a-z0-9]`.
pub fn is_canonical_id(identifier: &str) -> bool {
    identifier.len() == CANONICAL_ID_LEN
        && identifier.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// Resolve a vault identifier to its canonical ID.
pub async fn resolve_vault_id(client: &dyn ConnectClient, identifier: &str) -> Result<String> {
    if is_canonical_id(identifier) {
        return Ok(identifier.to_string());
    }

    let vaults = client
        .get_vaults_by_title(identifier)
        .await
        .map_err(|e| PluginError::upstream("unable to resolve vault", e))?;

    let candidates = vaults.iter().map(|v| (v.id.as_str(), v.created_at));
    pick_oldest(ResourceKind::Vault, identifier, candidates)
}

/// Resolve an item identifier within `vault_id` to its canonical ID.
pub async fn resolve_item_id(
    client: &dyn ConnectClient,
    identifier: &str,
    vault_id: &str,
) -> Result<String> {
    if is_canonical_id(identifier) {
        return Ok(identifier.to_string());
    }

    let items = client
        .get_items_by_title(identifier, vault_id)
        .await
        .map_err(|e| PluginError::upstream("unable to resolve item", e))?;

    let candidates = items.iter().map(|i| (i.id.as_str(), i.created_at));
    pick_oldest(ResourceKind::Item, identifier, candidates)
}

fn pick_oldest<'a, I>(resource: ResourceKind, title: &str, candidates: I) -> Result<String>
where
    I: ExactSizeIterator<Item = (&'a str, DateTime<Utc>)>,
{
    let count = candidates.len();
    // min_by_key keeps the first of equal minima, so ties fall back to upstream order
    let Some((id, created_at)) = candidates.min_by_key(|(_, created_at)| *created_at) else {
        return Err(PluginError::not_found(resource, title));
    };

    if count > 1 {
        info!(
            resource = %resource,
            title = %title,
            matches = count,
            chosen_id = %id,
            chosen_created_at = %created_at.to_rfc3339(),
            "Multiple {}s share this title; using the oldest",
            resource
        );
    } else {
        debug!(resource = %resource, title = %title, id = %id, "Resolved title");
    }

    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
    }

    #[test]
    fn test_canonical_id_shape() {
        assert!(is_canonical_id("ftz4pm2xxwmwrsd7rjqn7grzfz"));
        assert!(!is_canonical_id("FTZ4PM2XXWMWRSD7RJQN7GRZFZ"));
        assert!(!is_canonical_id("ftz4pm2xxwmwrsd7rjqn7grzf"));
        assert!(!is_canonical_id("ftz4pm2xxwmwrsd7rjqn7grzfz1"));
        assert!(!is_canonical_id("Production Database"));
        assert!(!is_canonical_id(""));
    }

    #[test]
    fn test_pick_oldest_prefers_earliest() {
        let candidates = vec![("newer", at(200)), ("oldest", at(100)), ("middle", at(150))];
        let id =
            pick_oldest(ResourceKind::Item, "db", candidates.iter().map(|(i, t)| (*i, *t))).unwrap();
        assert_eq!(id, "oldest");
    }

    #[test]
    fn test_pick_oldest_ties_keep_upstream_order() {
        let candidates = vec![("first", at(100)), ("second", at(100))];
        let id =
            pick_oldest(ResourceKind::Vault, "v", candidates.iter().map(|(i, t)| (*i, *t))).unwrap();
        assert_eq!(id, "first");
    }

    #[test]
    fn test_pick_oldest_no_match() {
        let candidates: Vec<(&str, DateTime<Utc>)> = Vec::new();
        let err =
            pick_oldest(ResourceKind::Vault, "Missing", candidates.into_iter()).unwrap_err();
        assert_eq!(err.to_string(), "vault not found: 'Missing'");
    }

    proptest! {
        #[test]
        fn prop_generated_ids_are_canonical(id in "[a-z0-9]{26}") {
            prop_assert!(is_canonical_id(&id));
        }

        #[test]
        fn prop_wrong_length_is_never_canonical(id in "[a-z0-9]{0,25}|[a-z0-9]{27,40}") {
            prop_assert!(!is_canonical_id(&id));
        }

        #[test]
        fn prop_titles_with_spaces_are_never_canonical(left in "[a-z0-9]{1,12}", right in "[a-z0-9]{1,12}") {
            let title = format!("{} {}", left, right);
            prop_assert!(!is_canonical_id(&title));
        }
    }
}
