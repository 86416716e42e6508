//! # Storage
//!
//! Key-value storage collaborator used to persist the plugin configuration.
//! The host hands every request a storage handle; the plugin only needs
//! `get` and `put` of opaque byte entries, with JSON helpers on top.
//!
//! Two implementations ship with the crate:
//! - [`InMemoryStorage`]: process-local map, used in tests and by default
//! - [`FileStorage`]: one file per key under a data directory

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::InMemoryStorage;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors raised by a storage implementation.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The key cannot be mapped onto the backing store.
    #[error("invalid storage key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// I/O errors from file-backed storage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub key: String,
    pub value: Vec<u8>,
}

impl StorageEntry {
    pub fn new(key: impl Into<String>, value: Vec<u8>) -> Self {
        Self { key: key.into(), value }
    }

    /// Encode `value` as JSON under `key`.
    pub fn json<T: Serialize>(key: impl Into<String>, value: &T) -> serde_json::Result<Self> {
        Ok(Self { key: key.into(), value: serde_json::to_vec(value)? })
    }

    /// Decode the stored bytes as JSON.
    pub fn decode_json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.value)
    }
}

/// Key-value storage handed to the backend with every request.
///
/// Writes are serialized by the implementation; the backend performs no
/// cross-request locking of its own.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetch the entry stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<StorageEntry>, StorageError>;

    /// Store `entry`, replacing any previous value under the same key.
    async fn put(&self, entry: StorageEntry) -> Result<(), StorageError>;
}
