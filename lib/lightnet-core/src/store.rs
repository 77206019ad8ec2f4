//! Persistent key-value storage.
//!
//! The header tracker persists one serialized mapping per group through a
//! [`KeyValueStore`]. Two implementations ship with the crate: an in-memory
//! [`MemoryStore`] and a [`JsonFileStore`] backed by a single JSON document.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{Error, Result};

/// Namespaced string storage.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Read the value stored under `key` in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the backing storage cannot be read.
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key` in `namespace`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the backing storage cannot be written.
    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()>;
}

type Namespaces = BTreeMap<String, BTreeMap<String, String>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Memory Store
// ============================================================================

/// Process-local store, lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.entries)
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
        lock(&self.entries).insert((namespace.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}

// ============================================================================
// JSON File Store
// ============================================================================

/// Store persisted as one JSON document: `{namespace: {key: value}}`.
///
/// The document is read on every access and rewritten on every `set`, so
/// several stores (or processes) pointing to the same file observe each
/// other's writes. A missing file reads as empty.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Location of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Namespaces> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(Namespaces::new()),
            Ok(bytes) => crate::from_json(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Namespaces::new()),
            Err(e) => Err(Error::store(format!(
                "cannot read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn write(&self, namespaces: &Namespaces) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(namespaces)?;
        std::fs::write(&self.path, bytes).map_err(|e| {
            Error::store(format!("cannot write {}: {e}", self.path.display()))
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        let _guard = lock(&self.guard);
        Ok(self
            .read()?
            .get(namespace)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
        let _guard = lock(&self.guard);
        let mut namespaces = self.read()?;
        namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self.write(&namespaces)
    }
}
