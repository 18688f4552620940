//! Client-side key/value persistence.
//!
//! The client keeps its state in a small string key/value store, one JSON
//! document per key. Reads and writes are synchronous.

use crate::error::{CorpoError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

pub const TOKEN_STORAGE_KEY: &str = "corpo_agent_token";
pub const SESSION_STORAGE_KEY: &str = "corpo_agent_session";
pub const CHAT_STORAGE_KEY: &str = "corpo_agent_chat";

/// A synchronous string key/value store.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the key. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local store, used by tests and ephemeral clients.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| CorpoError::storage("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// A typed JSON document stored under one key.
pub struct PersistedBlob<T> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for PersistedBlob<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key,
            _phantom: PhantomData,
        }
    }
}

impl<T> PersistedBlob<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            _phantom: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Loads and decodes the document.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Document present and valid
    /// - `Ok(None)`: Key absent or empty
    /// - `Err`: Storage failure or the document does not decode
    pub fn load(&self) -> Result<Option<T>> {
        match self.store.get(self.key)? {
            Some(raw) if !raw.trim().is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    /// Loads the document, falling back to `T::default()` on absence or any
    /// failure. `on_error` sees the failure before it is discarded.
    pub fn load_or_else(&self, on_error: impl FnOnce(&CorpoError)) -> T
    where
        T: Default,
    {
        match self.load() {
            Ok(value) => value.unwrap_or_default(),
            Err(err) => {
                on_error(&err);
                T::default()
            }
        }
    }

    pub fn save(&self, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(self.key, &raw)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(self.key)
    }
}
