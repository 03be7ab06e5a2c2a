//! Key/value persistence
//!
//! Backends:
//! - `MemoryStore` for tests and ephemeral runs
//! - `FileStore` on native, one file per key
//! - `LocalStore` on wasm32, backed by `window.localStorage`
//!
//! Failures never reach the simulation; callers log them and fall back.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod local;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

#[derive(Debug)]
pub enum StoreError {
    /// Backend is not reachable (no window, storage disabled)
    Unavailable,
    /// Reading or writing the backend failed
    Io { key: String, message: String },
    /// Stored value did not decode
    Decode { key: String, message: String },
    /// Value did not encode
    Encode { key: String, message: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::Io { key, message } => write!(f, "storage i/o failed for {key}: {message}"),
            Self::Decode { key, message } => write!(f, "stored {key} is corrupt: {message}"),
            Self::Encode { key, message } => write!(f, "could not encode {key}: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// String key/value storage
pub trait KeyValueStore {
    /// `Ok(None)` when the key has never been written
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Read and decode a JSON value
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw).map(Some).map_err(|e| StoreError::Decode {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Encode and write a JSON value
pub fn save_json<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value).map_err(|e| StoreError::Encode {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, &json)
}

/// In-memory store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Platform default store
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store(dir: impl Into<std::path::PathBuf>) -> Box<dyn KeyValueStore> {
    Box::new(FileStore::new(dir))
}

#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn KeyValueStore> {
    Box::new(LocalStore)
}
