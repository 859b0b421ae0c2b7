//! In-memory session store

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::session::{SessionStore, StorageKey};
use crate::Result;

/// Process-local [`SessionStore`] backed by a map
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<StorageKey, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with values
    pub fn with_values<'a>(values: impl IntoIterator<Item = (StorageKey, &'a str)>) -> Self {
        let values = values
            .into_iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect();
        Self { values: RwLock::new(values) }
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>> {
        Ok(self.values.read().get(&key).cloned())
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<()> {
        self.values.write().insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<()> {
        self.values.write().remove(&key);
        Ok(())
    }
}
