//! File-based store.
//!
//! [`FileStore`] keeps each key in its own JSON file under a root directory:
//!
//! ```text
//! {root}/
//! +-- CookieConsent.json   # {"value": "true", "expires_at": 1767225600}
//! ```
//!
//! Writes go to a sibling temporary file which is then renamed over the
//! record, so readers see either the old or the new record and never a torn
//! one. Records that fail to parse or have expired read as absent.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::{ConsentStore, StoreError, StoreErrorKind};

const BACKEND: &str = "File";

/// On-disk record format.
#[derive(Debug, Serialize, Deserialize)]
struct Record {
    value: String,
    /// Expiry as seconds since Unix epoch. `None` never expires.
    #[serde(default)]
    expires_at: Option<u64>,
}

/// Durable [`ConsentStore`] rooted at a directory on disk.
///
/// The root directory is created lazily on first write.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    max_age: Option<Duration>,
}

impl FileStore {
    /// Create a store rooted at `root` whose records never expire.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            max_age: None,
        }
    }

    /// Expire records `max_age` after they are written.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Root directory of this store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }

    fn discard(path: &Path) {
        if let Err(e) = fs::remove_file(path)
            && e.kind() != ErrorKind::NotFound
        {
            tracing::debug!(path = %path.display(), error = %e, "Failed to remove stale record");
        }
    }
}

/// Keys become file names, so restrict them to a portable character set.
fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::new(StoreErrorKind::InvalidKey)
            .with_key(key)
            .with_backend(BACKEND))
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

impl ConsentStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.record_path(key)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(e, key).with_backend(BACKEND)),
        };

        let record: Record = match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt consent record");
                return Ok(None);
            }
        };

        if let Some(expires_at) = record.expires_at
            && expires_at <= now_secs()
        {
            tracing::debug!(key, expires_at, "Consent record expired");
            Self::discard(&path);
            return Ok(None);
        }

        Ok(Some(record.value))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.record_path(key)?;
        fs::create_dir_all(&self.root).map_err(|e| StoreError::io(e, key).with_backend(BACKEND))?;

        let record = Record {
            value: value.to_owned(),
            expires_at: self.max_age.map(|age| now_secs().saturating_add(age.as_secs())),
        };
        let json = serde_json::to_vec(&record).map_err(|e| {
            StoreError::new(StoreErrorKind::Other)
                .with_key(key)
                .with_backend(BACKEND)
                .with_source(e)
        })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &json).map_err(|e| StoreError::io(e, key).with_backend(BACKEND))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            Self::discard(&tmp);
            return Err(StoreError::io(e, key).with_backend(BACKEND));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(e, key).with_backend(BACKEND)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("consent"));

        assert_eq!(store.read("CookieConsent").unwrap(), None);
        store.write("CookieConsent", "true").unwrap();
        assert_eq!(
            store.read("CookieConsent").unwrap(),
            Some("true".to_owned())
        );
    }

    #[test]
    fn test_survives_new_instance() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("consent");

        FileStore::new(root.clone())
            .write("CookieConsent", "false")
            .unwrap();

        let reopened = FileStore::new(root);
        assert_eq!(
            reopened.read("CookieConsent").unwrap(),
            Some("false".to_owned())
        );
    }

    #[test]
    fn test_overwrite_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().to_path_buf());

        store.write("k", "true").unwrap();
        store.write("k", "false").unwrap();

        assert_eq!(store.read("k").unwrap(), Some("false".to_owned()));
        assert!(!tmp.path().join("k.json.tmp").exists());
    }

    #[test]
    fn test_remove() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().to_path_buf());

        store.write("k", "true").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.read("k").unwrap(), None);

        // Removing again is not an error
        store.remove("k").unwrap();
    }

    #[test]
    fn test_corrupt_record_reads_as_absent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("k.json"), "{not json").unwrap();

        let store = FileStore::new(tmp.path().to_path_buf());
        assert_eq!(store.read("k").unwrap(), None);
    }

    #[test]
    fn test_expired_record_reads_as_absent_and_is_removed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("k.json");
        fs::write(&path, r#"{"value": "true", "expires_at": 1}"#).unwrap();

        let store = FileStore::new(tmp.path().to_path_buf());
        assert_eq!(store.read("k").unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_max_age_sets_future_expiry() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().to_path_buf())
            .with_max_age(Duration::from_secs(365 * 24 * 60 * 60));

        store.write("k", "true").unwrap();

        let raw = fs::read_to_string(tmp.path().join("k.json")).unwrap();
        let record: Record = serde_json::from_str(&raw).unwrap();
        assert!(record.expires_at.unwrap() > now_secs());
        assert_eq!(store.read("k").unwrap(), Some("true".to_owned()));
    }

    #[test]
    fn test_record_without_expiry_field() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("k.json"), r#"{"value": "false"}"#).unwrap();

        let store = FileStore::new(tmp.path().to_path_buf());
        assert_eq!(store.read("k").unwrap(), Some("false".to_owned()));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().to_path_buf());

        for key in ["", "../escape", "a/b", ".hidden"] {
            let err = store.write(key, "true").unwrap_err();
            assert_eq!(err.kind, StoreErrorKind::InvalidKey, "key {key:?}");
        }
    }
}
