//! In-process store.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{ConsentStore, StoreError, StoreErrorKind};

/// Store backed by a map in process memory.
///
/// Values live as long as the store itself, which makes it the equivalent of
/// page-scoped storage. Share one instance (e.g. behind an `Arc`) between
/// controllers to simulate reloads against the same origin.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self {
            entries: RwLock::new(entries),
        }
    }
}

fn poisoned(key: &str) -> StoreError {
    StoreError::new(StoreErrorKind::Unavailable)
        .with_key(key)
        .with_backend("Memory")
}

impl ConsentStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| poisoned(key))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| poisoned(key))?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| poisoned(key))?;
        entries.remove(key);
        Ok(())
    }
}
