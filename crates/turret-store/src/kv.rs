//! Opaque key-value backend behind the function store and the allow-list.
//!
//! The backend contract deliberately includes `put_if_absent`: "does hash X
//! exist" followed by "store hash X" is a check-then-act sequence that two
//! concurrent uploads of the same payload can race, so the final persist is
//! an atomic conditional put and the loser gets a clean conflict.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use turret_core::{Result, TurretError};

/// Associative store used for function bodies and the allow-list.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Whether `key` is present.
    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Store `value` under `key` only if the key is absent.
    ///
    /// Returns `true` when the value was stored, `false` when the key
    /// already existed. The check and the write are atomic.
    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool>;
}

/// In-memory backend for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryKvStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`. Test convenience.
    pub fn with_entries(entries: impl IntoIterator<Item = (String, Vec<u8>)>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().collect()),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.entries.read().await.contains_key(key))
    }

    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value);
        Ok(true)
    }
}

/// Filesystem backend storing one `<key>.dat` file per entry.
#[derive(Debug, Clone)]
pub struct FilesystemKvStore {
    base_path: PathBuf,
}

impl FilesystemKvStore {
    /// Create a store rooted at `base_path`.
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.dat"))
    }
}

#[async_trait]
impl KeyValueStore for FilesystemKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.file_path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TurretError::unavailable(format!("storage read: {e}"))),
        }
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.file_path(key).exists())
    }

    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool> {
        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| TurretError::unavailable(format!("storage mkdir: {e}")))?;

        // create_new makes the existence check and the create one atomic
        // filesystem operation.
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.file_path(key))
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(TurretError::unavailable(format!("storage create: {e}"))),
        };
        file.write_all(&value)
            .await
            .map_err(|e| TurretError::unavailable(format!("storage write: {e}")))?;
        file.flush()
            .await
            .map_err(|e| TurretError::unavailable(format!("storage flush: {e}")))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_put_if_absent_is_first_wins() {
        let store = MemoryKvStore::new();
        assert!(store.put_if_absent("k", b"first".to_vec()).await.unwrap());
        assert!(!store.put_if_absent("k", b"second".to_vec()).await.unwrap());
        assert_eq!(store.get("k").await.unwrap().unwrap(), b"first");
        assert!(store.contains("k").await.unwrap());
        assert!(!store.contains("other").await.unwrap());
    }

    #[tokio::test]
    async fn filesystem_round_trip_and_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemKvStore::new(dir.path().to_path_buf());

        assert_eq!(store.get("missing").await.unwrap(), None);
        assert!(store.put_if_absent("k", b"v".to_vec()).await.unwrap());
        assert!(!store.put_if_absent("k", b"w".to_vec()).await.unwrap());
        assert_eq!(store.get("k").await.unwrap().unwrap(), b"v");
    }
}
