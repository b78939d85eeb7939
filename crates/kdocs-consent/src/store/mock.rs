//! Mock store implementation for testing.
//!
//! Provides [`MockStore`] for exercising failure paths without a real backend.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{ConsentStore, StoreError, StoreErrorKind};

/// Operation recorded by [`MockStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Read(String),
    Write(String, String),
    Remove(String),
}

/// Mock store for testing.
///
/// Behaves like an in-memory store, but each operation can be configured to
/// fail with a given error kind. Every attempted operation is logged, including
/// failed ones.
#[derive(Debug, Default)]
pub struct MockStore {
    values: RwLock<HashMap<String, String>>,
    ops: RwLock<Vec<StoreOp>>,
    read_failure: Option<StoreErrorKind>,
    write_failure: Option<StoreErrorKind>,
    remove_failure: Option<StoreErrorKind>,
}

impl MockStore {
    /// Create a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a value.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_value(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values
            .write()
            .unwrap()
            .insert(key.into(), value.into());
        self
    }

    /// Make every read fail with `kind`.
    #[must_use]
    pub fn failing_reads(mut self, kind: StoreErrorKind) -> Self {
        self.read_failure = Some(kind);
        self
    }

    /// Make every write fail with `kind`.
    #[must_use]
    pub fn failing_writes(mut self, kind: StoreErrorKind) -> Self {
        self.write_failure = Some(kind);
        self
    }

    /// Make every remove fail with `kind`.
    #[must_use]
    pub fn failing_removes(mut self, kind: StoreErrorKind) -> Self {
        self.remove_failure = Some(kind);
        self
    }

    /// Operations attempted so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.read().unwrap().clone()
    }

    /// Raw stored value, bypassing failure injection.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.values.read().unwrap().get(key).cloned()
    }

    fn record(&self, op: StoreOp) {
        self.ops.write().unwrap().push(op);
    }
}

fn injected(kind: StoreErrorKind, key: &str) -> StoreError {
    StoreError::new(kind).with_key(key).with_backend("Mock")
}

impl ConsentStore for MockStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.record(StoreOp::Read(key.to_owned()));
        if let Some(kind) = self.read_failure {
            return Err(injected(kind, key));
        }
        Ok(self.values.read().unwrap().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.record(StoreOp::Write(key.to_owned(), value.to_owned()));
        if let Some(kind) = self.write_failure {
            return Err(injected(kind, key));
        }
        self.values
            .write()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.record(StoreOp::Remove(key.to_owned()));
        if let Some(kind) = self.remove_failure {
            return Err(injected(kind, key));
        }
        self.values.write().unwrap().remove(key);
        Ok(())
    }
}
