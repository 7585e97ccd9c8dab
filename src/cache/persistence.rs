//! Persistence Module
//!
//! Local key-value storage backing the cache, and the load/save helpers for
//! the single JSON slot holding the whole cache map.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

/// Store key holding the serialized cache map.
pub const PERSISTENCE_KEY: &str = "scanner_cache";

// == Key Value Store Trait ==
/// A small string-to-string store, the local equivalent of browser storage.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Returns the stored value, or None if the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Lists every stored key.
    fn keys(&self) -> Result<Vec<String>>;
}

fn check_quota(quota: Option<usize>, needed: usize) -> Result<()> {
    match quota {
        Some(limit) if needed > limit => Err(CacheError::QuotaExceeded { needed, limit }),
        _ => Ok(()),
    }
}

// == File Store ==
/// Stores each key as `<key>.json` in one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    /// Largest value accepted by `set_item`, in bytes
    quota: Option<usize>,
}

impl FileStore {
    /// Opens (and creates if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, quota: None })
    }

    /// Limits the size of any single stored value.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        check_quota(self.quota, value.len())?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

// == Memory Store ==
/// In-process store, used for tests and non-persistent deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the size of any single stored value.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Seeds a value, bypassing the quota.
    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.lock().insert(key.to_string(), value.to_string());
        self
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        check_quota(self.quota, value.len())?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

// == Slot Helpers ==
/// Reads the persisted map, dropping entries already expired at `now`.
///
/// An absent slot is an empty map; an unparsable one is `CorruptPersistence`.
/// Each entry's `key` is rewritten to the map key it was stored under.
pub fn load_entries(
    store: &dyn KeyValueStore,
    now: u64,
) -> Result<HashMap<String, CacheEntry>> {
    let Some(raw) = store.get_item(PERSISTENCE_KEY)? else {
        return Ok(HashMap::new());
    };

    let entries: HashMap<String, CacheEntry> = serde_json::from_str(&raw)
        .map_err(|e| CacheError::CorruptPersistence(e.to_string()))?;

    Ok(entries
        .into_iter()
        .filter(|(_, entry)| !entry.is_expired(now))
        .map(|(key, mut entry)| {
            if entry.key != key {
                warn!(key = %key, stored = %entry.key, "Persisted entry key mismatch, repairing");
                entry.key = key.clone();
            }
            (key, entry)
        })
        .collect())
}

/// Serializes the whole map into the slot.
pub fn save_entries(
    store: &dyn KeyValueStore,
    entries: &HashMap<String, CacheEntry>,
) -> Result<()> {
    let blob = serde_json::to_string(entries)?;
    store.set_item(PERSISTENCE_KEY, &blob)
}

/// Removes the slot.
pub fn clear_entries(store: &dyn KeyValueStore) -> Result<()> {
    store.remove_item(PERSISTENCE_KEY)
}
