//! Persistent key-value medium
//!
//! The cache never talks to a concrete storage API; it is handed a [`Store`].

use crate::error::StoreError;
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fmt::Debug;

/// Origin-scoped, enumerable string store
///
/// Implementations must enumerate keys in a stable order (insertion order
/// for the bundled adapters); cache lookups return the first match in that
/// order.
#[async_trait]
pub trait Store: Send + Sync + Debug {
    /// Insert or replace a value
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Read a value
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// All keys in enumeration order
    async fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Delete a key; absent keys are ignored
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Volatile store for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<IndexMap<String, String>>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the store holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.lock().keys().cloned().collect())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().shift_remove(key);
        Ok(())
    }
}
