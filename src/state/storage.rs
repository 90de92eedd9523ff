//! On-device key-value storage for the persisted session.
//!
//! ARCHITECTURE
//! ============
//! The session lives in two string entries, [`TOKEN_KEY`] and [`USER_KEY`].
//! Stores expose multi-key operations so both entries are written or removed
//! in one call and never end up half-updated.
//!
//! `MemoryStore` backs tests and throwaway runs. `FileStore` keeps a flat JSON
//! object on disk and replaces it atomically through a temp file + rename.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::BTreeMap;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

/// Raw bearer token entry.
pub const TOKEN_KEY: &str = "userToken";
/// JSON-serialized user entry.
pub const USER_KEY: &str = "userData";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// String key-value store with batched reads and writes.
///
/// Methods are async so implementations backed by blocking IO can move the
/// work off the runtime threads.
pub trait KeyValueStore: Send + Sync {
    /// Read several keys at once. The result lines up with `keys`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get_many(&self, keys: &[&str]) -> impl Future<Output = Result<Vec<Option<String>>, StorageError>> + Send;

    /// Write all entries in a single operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written; no entry is
    /// applied in that case.
    fn set_many(&self, entries: &[(&str, &str)]) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Remove all keys in a single operation. Missing keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove_many(&self, keys: &[&str]) -> impl Future<Output = Result<(), StorageError>> + Send;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_many(&self, keys: &[&str]) -> impl Future<Output = Result<Vec<Option<String>>, StorageError>> + Send {
        (**self).get_many(keys)
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> impl Future<Output = Result<(), StorageError>> + Send {
        (**self).set_many(entries)
    }

    fn remove_many(&self, keys: &[&str]) -> impl Future<Output = Result<(), StorageError>> + Send {
        (**self).remove_many(keys)
    }
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a single key. Convenience for callers that inspect the store.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(keys.iter().map(|key| entries.get(*key).cloned()).collect())
    }

    async fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in pairs {
            entries.insert((*key).to_owned(), (*value).to_owned());
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// JSON-file store. The whole map is rewritten on every change.
///
/// File IO runs on tokio's blocking pool. A file that no longer parses holds
/// no usable session, so writes replace it instead of failing.
#[derive(Clone, Debug)]
pub struct FileStore {
    inner: Arc<FileInner>,
}

#[derive(Debug)]
struct FileInner {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { inner: Arc::new(FileInner { path: path.into(), guard: Mutex::new(()) }) }
    }

    async fn run<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&FileInner) -> Result<T, StorageError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let _guard = inner.guard.lock().unwrap_or_else(PoisonError::into_inner);
            op(inner.as_ref())
        })
        .await
        .map_err(|e| StorageError::Io(std::io::Error::other(e)))?
    }
}

impl FileInner {
    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Like [`Self::load`], but a corrupt file reads as empty.
    fn load_for_write(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.load() {
            Err(StorageError::Corrupt(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "replacing corrupt storage file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let body = serde_json::to_vec_pretty(entries)?;
        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = dir.join(tmp_name);
        {
            let mut file = std::fs::File::create(&tmp_path)?;
            file.write_all(&body)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn owned_keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|key| (*key).to_owned()).collect()
}

impl KeyValueStore for FileStore {
    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError> {
        let keys = owned_keys(keys);
        self.run(move |file| {
            let entries = file.load()?;
            Ok(keys.iter().map(|key| entries.get(key).cloned()).collect())
        })
        .await
    }

    async fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError> {
        let pairs: Vec<(String, String)> =
            pairs.iter().map(|(key, value)| ((*key).to_owned(), (*value).to_owned())).collect();
        self.run(move |file| {
            let mut entries = file.load_for_write()?;
            entries.extend(pairs);
            file.save(&entries)
        })
        .await
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let keys = owned_keys(keys);
        self.run(move |file| {
            if !file.path.exists() {
                return Ok(());
            }
            let mut entries = file.load_for_write()?;
            for key in &keys {
                entries.remove(key);
            }
            file.save(&entries)
        })
        .await
    }
}
