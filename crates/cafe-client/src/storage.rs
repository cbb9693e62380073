//! Local key-value stores for the token and list snapshots

use crate::error::{ClientError, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Snapshot key for the public menu
pub const MENU_SNAPSHOT: &str = "menu";

/// Snapshot key for the public news list
pub const NEWS_SNAPSHOT: &str = "news";

/// Snapshot key for the category list
pub const CATEGORIES_SNAPSHOT: &str = "categories";

/// String key-value storage
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`
    ///
    /// # Errors
    ///
    /// Returns a storage error if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Forget `key`
    ///
    /// # Errors
    ///
    /// Returns a storage error if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Store that lives as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Store persisted as one JSON object in a file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file is missing or unreadable
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Discarding unreadable store {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read store {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        debug!("Opened store {} with {} keys", path.display(), entries.len());
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// File backing the store
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&entries)
    }
}

/// A cached copy of a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    /// When the list was fetched
    pub saved_at: DateTime<Utc>,
    /// The list itself
    pub items: Vec<T>,
}

#[derive(Serialize)]
struct SnapshotRef<'a, T> {
    saved_at: DateTime<Utc>,
    items: &'a [T],
}

/// Last successfully fetched lists, used when the server cannot be reached
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    store: Arc<dyn KeyValueStore>,
}

impl SnapshotCache {
    /// Cache snapshots in `store`
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Replace the snapshot under `key`
    ///
    /// # Errors
    ///
    /// Returns a storage error if the snapshot cannot be written.
    pub fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(&SnapshotRef {
            saved_at: Utc::now(),
            items,
        })
        .map_err(|e| ClientError::Storage(e.to_string()))?;
        self.store.set(key, &raw)
    }

    /// Snapshot under `key`; one that no longer parses is removed
    #[must_use]
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<Snapshot<T>> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Discarding unreadable {} snapshot: {}", key, e);
                if let Err(e) = self.store.remove(key) {
                    warn!("Failed to remove {} snapshot: {}", key, e);
                }
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("token"), None);
        store.set("token", "abc").unwrap();
        assert_eq!(store.get("token").as_deref(), Some("abc"));
        store.remove("token").unwrap();
        assert_eq!(store.get("token"), None);
    }

    #[test]
    fn test_file_store_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::open(&path);
        store.set("token", "abc").unwrap();
        store.set("menu", "[]").unwrap();
        store.remove("menu").unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("token").as_deref(), Some("abc"));
        assert_eq!(reopened.get("menu"), None);
    }

    #[test]
    fn test_file_store_discards_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get("token"), None);
        store.set("token", "abc").unwrap();
        assert_eq!(FileStore::open(&path).get("token").as_deref(), Some("abc"));
    }

    #[test]
    fn test_snapshot_round_trip_and_discard() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let cache = SnapshotCache::new(Arc::clone(&store));

        cache.save(NEWS_SNAPSHOT, &["a".to_string(), "b".to_string()]).unwrap();
        let snapshot: Snapshot<String> = cache.load(NEWS_SNAPSHOT).unwrap();
        assert_eq!(snapshot.items, vec!["a", "b"]);

        store.set(MENU_SNAPSHOT, r#"{"items": 5}"#).unwrap();
        assert!(cache.load::<String>(MENU_SNAPSHOT).is_none());
        assert_eq!(store.get(MENU_SNAPSHOT), None);
    }
}
