//! In-memory store
//!
//! Backs both storage ports with a `parking_lot` guarded map. Used as the
//! session store in hosts without one and throughout the tests.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::error::StorageResult;
use super::traits::{KeyValueStore, SessionStore};

/// Thread-safe in-memory map; clones share the same data
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        KeyValueStore::get(self, key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        KeyValueStore::set(self, key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        KeyValueStore::remove(self, key)
    }

    fn take(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.write().remove(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        KeyValueStore::set(&store, "a", "1").unwrap();
        assert_eq!(KeyValueStore::get(&store, "a").unwrap().as_deref(), Some("1"));

        KeyValueStore::remove(&store, "a").unwrap();
        assert!(store.is_empty());
        KeyValueStore::remove(&store, "a").unwrap();
    }

    #[test]
    fn clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        KeyValueStore::set(&other, "k", "v").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.keys().unwrap(), vec!["k".to_string()]);
    }

    #[test]
    fn take_removes_value() {
        let store = MemoryStore::new();
        SessionStore::set(&store, "nonce", "hash").unwrap();
        assert_eq!(store.take("nonce").unwrap().as_deref(), Some("hash"));
        assert_eq!(store.take("nonce").unwrap(), None);
    }
}
