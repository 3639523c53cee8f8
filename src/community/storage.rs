//! Local key-value persistence for community widgets.
//!
//! Values are JSON strings under fixed keys. [`FileStore`] keeps the whole
//! map in one JSON file on this machine and rewrites it on every change;
//! nothing is ever sent over the network.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value under '{key}' is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value: {0}")]
    Encode(#[source] serde_json::Error),
}

/// String-to-string storage with browser local-storage semantics.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Decode the JSON value stored under `key`.
pub fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key) {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encode `value` as JSON and store it under `key`.
pub fn set_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(StorageError::Encode)?;
    store.set(key, raw)
}

/// In-process store; contents vanish with the process.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.inner.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
#[derive(Clone)]
pub struct FileStore {
    inner: Arc<DashMap<String, String>>,
    path: PathBuf,
}

impl FileStore {
    /// Open `path`, loading its contents if the file exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let store = Self {
            inner: Arc::new(DashMap::new()),
            path,
        };

        if store.path.exists() {
            let reader = BufReader::new(File::open(&store.path)?);
            let map: BTreeMap<String, String> =
                serde_json::from_reader(reader).map_err(|source| StorageError::Corrupt {
                    key: store.path.display().to_string(),
                    source,
                })?;
            for (k, v) in map {
                store.inner.insert(k, v);
            }
            tracing::debug!(
                path = %store.path.display(),
                keys = store.inner.len(),
                "Loaded community storage"
            );
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StorageError> {
        let map: BTreeMap<_, _> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();

        let writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(writer, &map).map_err(StorageError::Encode)?;
        tracing::debug!(path = %self.path.display(), keys = map.len(), "Saved community storage");
        Ok(())
    }

    /// Save, putting `key` back to `previous` in memory if the file write fails.
    fn save_or_restore(&self, key: &str, previous: Option<String>) -> Result<(), StorageError> {
        let result = self.save();
        if result.is_err() {
            match previous {
                Some(value) => {
                    self.inner.insert(key.to_string(), value);
                }
                None => {
                    self.inner.remove(key);
                }
            }
        }
        result
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let previous = self.inner.insert(key.to_string(), value);
        self.save_or_restore(key, previous)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let previous = self.inner.remove(key).map(|(_, v)| v);
        self.save_or_restore(key, previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("adt-storage-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.get("k").is_none());
        store.set("k", "v".into()).unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(store.get("k").is_none());
    }

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();
        set_json(&store, "numbers", &vec![1u32, 2, 3]).unwrap();
        let back: Option<Vec<u32>> = get_json(&store, "numbers").unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));

        store.set("broken", "{not json".into()).unwrap();
        let err = get_json::<Vec<u32>>(&store, "broken").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let path = temp_path();
        {
            let store = FileStore::open(&path).unwrap();
            store.set("userVote", "NFT Integration".into()).unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("userVote").as_deref(), Some("NFT Integration"));
        reopened.remove("userVote").unwrap();

        let again = FileStore::open(&path).unwrap();
        assert!(again.get("userVote").is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let path = temp_path();
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StorageError::Corrupt { .. })));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_failed_save_leaves_memory_unchanged() {
        // The parent directory does not exist, so every save fails.
        let path = std::env::temp_dir()
            .join(format!("adt-missing-{}", uuid::Uuid::new_v4()))
            .join("store.json");
        let store = FileStore::open(&path).unwrap();

        assert!(matches!(
            store.set("userVote", "NFT Integration".into()),
            Err(StorageError::Io(_))
        ));
        assert!(store.get("userVote").is_none());
        assert!(!path.exists());
    }
}
