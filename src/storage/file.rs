//! Directory-backed storage: one file per key.
//!
//! Keys may contain `/` separators, which map onto subdirectories. Empty
//! segments and `.`/`..` are rejected so a key can never escape the root.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{Storage, StorageEntry, StorageError};

#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
    // serializes writes so concurrent puts never interleave on disk
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Open storage rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root, write_lock: Mutex::new(()) })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let invalid = |reason: &str| StorageError::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        let key = key.trim_end_matches('/');
        if key.is_empty() {
            return Err(invalid("key is empty"));
        }

        let mut path = self.root.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(invalid("key contains an empty or relative segment"));
            }
            path.push(segment);
        }
        Ok(path)
    }
}

/// Sibling file a write is staged in before the rename. The suffix is
/// appended so `a.b` and `a` never share a staging file.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<StorageEntry>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(value) => Ok(Some(StorageEntry::new(key, value))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            // a directory at this path means deeper keys exist but this one does not
            Err(_) if path.is_dir() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, entry: StorageEntry) -> Result<(), StorageError> {
        let path = self.path_for(&entry.key)?;
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = temp_path(&path);
        tokio::fs::write(&tmp, &entry.value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(key = %entry.key, bytes = entry.value.len(), "Stored entry on disk");
        Ok(())
    }
}
