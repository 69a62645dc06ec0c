//! Key-value storage ports
//!
//! Both stores are string-to-string maps. `KeyValueStore` outlives the
//! process; `SessionStore` only needs to survive one authorization redirect.

use super::error::StorageResult;

/// Durable key-value storage
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Insert or replace a value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a value. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// All keys currently stored, in no particular order.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// Storage scoped to one browser session
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Read and remove a value in one step.
    fn take(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self.get(key)?;
        self.remove(key)?;
        Ok(value)
    }
}
