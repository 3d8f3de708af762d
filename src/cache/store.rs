//! Key-value persistence for the local loan cache.
//!
//! The cache only ever needs `get` and `set` on a handful of fixed keys, so
//! the trait stays that small. [`FileStore`] keeps one JSON file per key and
//! survives process restarts; [`MemoryStore`] lives and dies with the process.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Asynchronous string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns `Ok(None)` when the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrites the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Errors raised by the local persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
    #[error("Failed to encode cache contents: {0}")]
    Encode(#[from] serde_json::Error),
}

/// File-backed store: `<data_dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the full path for a key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }

    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty()
            || key.contains('/')
            || key.contains('\\')
            || key.contains("..")
            || key.starts_with('.')
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::validate_key(key)?;
        let path = self.path(key);

        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::validate_key(key)?;

        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|source| StorageError::Io {
                path: self.data_dir.clone(),
                source,
            })?;

        let path = self.path(key);
        let temp_path = path.with_extension("json.tmp");

        tokio::fs::write(&temp_path, value)
            .await
            .map_err(|source| StorageError::Io {
                path: temp_path.clone(),
                source,
            })?;

        // Rename is atomic on the filesystems we care about.
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|source| StorageError::Io { path, source })?;

        Ok(())
    }
}

/// In-process store, used for tests and for running without a data directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
