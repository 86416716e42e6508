//! Request path routing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{PluginError, Result};

static CONFIG_PATH: Lazy<Regex> = Lazy::new(|| compile(r"^config/?$"));
static VAULTS_PATH: Lazy<Regex> = Lazy::new(|| compile(r"^vaults/?$"));
static ITEMS_PATH: Lazy<Regex> = Lazy::new(|| compile(r"^vaults/(?P<vault>[^/]+)/items/?$"));
static ITEM_PATH: Lazy<Regex> =
    Lazy::new(|| compile(r"^vaults/(?P<vault>[^/]+)/items/(?P<id>[^/]+)$"));

fn compile(pattern: &str) -> Regex {
    // patterns are literals above; a failure here is a programming error
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid route pattern {}: {}", pattern, e))
}

/// A recognised request path with its captured segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Config,
    Vaults,
    Items { vault: String },
    Item { vault: String, id: String },
}

impl Route {
    /// Match a path, ignoring leading slashes.
    pub fn parse(path: &str) -> Result<Self> {
        let path = path.trim_start_matches('/');

        if CONFIG_PATH.is_match(path) {
            return Ok(Route::Config);
        }
        if VAULTS_PATH.is_match(path) {
            return Ok(Route::Vaults);
        }
        if let Some(caps) = ITEM_PATH.captures(path) {
            return Ok(Route::Item { vault: caps["vault"].to_string(), id: caps["id"].to_string() });
        }
        if let Some(caps) = ITEMS_PATH.captures(path) {
            return Ok(Route::Items { vault: caps["vault"].to_string() });
        }

        Err(PluginError::UnsupportedPath(path.to_string()))
    }

    /// Captured path segments, by field name
    pub fn captures(&self) -> Vec<(&'static str, &str)> {
        match self {
            Route::Config | Route::Vaults => Vec::new(),
            Route::Items { vault } => vec![("vault", vault.as_str())],
            Route::Item { vault, id } => vec![("vault", vault.as_str()), ("id", id.as_str())],
        }
    }
}
