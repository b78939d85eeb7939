//! Consent store trait and error types.
//!
//! A [`ConsentStore`] is a durable key-value slot scoped to one site. The
//! controller keeps a single key in it; backends decide how that key survives
//! page reloads (process memory, files on disk, or a browser cookie).
//!
//! # Implementations
//!
//! - [`MemoryStore`]: in-process map, lives as long as the value
//! - [`FileStore`]: one JSON record per key under a directory, with expiry
//! - [`CookieJar`]: request cookies in, `Set-Cookie` headers out
//! - [`DisabledStore`]: storage turned off; every operation fails
//! - `MockStore`: failure injection, compiled for unit tests only

mod cookie;
mod file;
mod memory;
#[cfg(test)]
mod mock;

pub use cookie::{CookieAttributes, CookieJar, SameSite};
pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(test)]
pub use mock::{MockStore, StoreOp};

/// Semantic error categories for store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorKind {
    /// Storage is disabled or not reachable.
    Unavailable,
    /// The backend refused the write because it is full.
    QuotaExceeded,
    /// Permission denied by the backend.
    PermissionDenied,
    /// Key cannot be represented by this backend.
    InvalidKey,
    /// Other/unknown error category.
    Other,
}

/// Store error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StoreError {
    /// Semantic error category.
    pub kind: StoreErrorKind,
    /// Key context (if applicable).
    pub key: Option<String>,
    /// Backend identifier (e.g., "File", "Cookie").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Create a new store error.
    #[must_use]
    pub fn new(kind: StoreErrorKind) -> Self {
        Self {
            kind,
            key: None,
            backend: None,
            source: None,
        }
    }

    /// Attach key context.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create an unavailable error for a key.
    #[must_use]
    pub fn unavailable(key: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unavailable).with_key(key)
    }

    /// Create a store error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, key: &str) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::ReadOnlyFilesystem => {
                StoreErrorKind::PermissionDenied
            }
            std::io::ErrorKind::StorageFull => StoreErrorKind::QuotaExceeded,
            std::io::ErrorKind::NotFound => StoreErrorKind::Unavailable,
            _ => StoreErrorKind::Other,
        };
        Self::new(kind).with_key(key).with_source(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (key: CookieConsent)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StoreErrorKind::Unavailable => "Storage unavailable",
            StoreErrorKind::QuotaExceeded => "Quota exceeded",
            StoreErrorKind::PermissionDenied => "Permission denied",
            StoreErrorKind::InvalidKey => "Invalid key",
            StoreErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(key) = &self.key {
            write!(f, " (key: {key})")?;
        }

        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Durable string slot keyed by name.
///
/// Writes must be visible to the next `read` on the same store once `write`
/// returns. Readers never observe a partially written value.
pub trait ConsentStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored (or the stored entry expired).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend rejects the write.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the value stored under `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be modified.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Store for browsers with storage turned off.
///
/// Every operation fails with [`StoreErrorKind::Unavailable`], so consent
/// never survives a reload.
pub struct DisabledStore;

impl ConsentStore for DisabledStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::unavailable(key).with_backend("Disabled"))
    }

    fn write(&self, key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::unavailable(key).with_backend("Disabled"))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        Err(StoreError::unavailable(key).with_backend("Disabled"))
    }
}
