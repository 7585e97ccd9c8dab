//! Cache Entry Module
//!
//! Defines individual cache entries with TTL and access bookkeeping, plus the
//! per-call options merged over the configured defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// One cached artifact with its metadata.
///
/// Field names follow the persisted blob layout (camelCase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Key the entry is stored under
    pub key: String,
    /// The cached payload
    pub data: Value,
    /// Creation timestamp (Unix milliseconds)
    pub timestamp: u64,
    /// Expiration timestamp (Unix milliseconds), always after `timestamp`
    pub expires_at: u64,
    /// Serialized payload size in bytes
    pub size: u64,
    /// Successful reads since insertion
    pub access_count: u64,
    /// Last successful read (Unix milliseconds)
    pub last_accessed: u64,
    /// Insertion order, last resort tie-break for eviction
    #[serde(default)]
    pub seq: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped at `now`.
    ///
    /// A zero TTL is stored as 1 ms so that `expires_at > timestamp` holds.
    pub fn new(key: String, data: Value, now: u64, ttl_ms: u64, seq: u64) -> Self {
        let size = data.to_string().len() as u64;
        Self {
            key,
            data,
            timestamp: now,
            expires_at: now.saturating_add(ttl_ms.max(1)),
            size,
            access_count: 0,
            last_accessed: now,
            seq,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once the current time reaches `expires_at`.
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    // == Touch ==
    /// Records a successful read.
    pub fn touch(&mut self, now: u64) {
        self.access_count += 1;
        self.last_accessed = now;
    }
}

// == Cache Settings ==
/// Fully resolved limits applied to an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Time to live in milliseconds
    pub ttl_ms: u64,
    /// Maximum resident size in bytes
    pub max_size: u64,
    /// Maximum number of entries
    pub max_entries: usize,
    /// Write the map to the backing store after the insert
    pub persist: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_ms: 24 * 60 * 60 * 1000,
            max_size: 50 * 1024 * 1024,
            max_entries: 1000,
            persist: true,
        }
    }
}

// == Cache Options ==
/// Per-call overrides. Unset fields fall back to the cache defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheOptions {
    pub ttl_ms: Option<u64>,
    pub max_size: Option<u64>,
    pub max_entries: Option<usize>,
    pub persist: Option<bool>,
}

impl CacheOptions {
    pub fn with_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = Some(ttl_ms);
        self
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    pub fn without_persistence(mut self) -> Self {
        self.persist = Some(false);
        self
    }

    /// Merges these overrides over `defaults`.
    ///
    /// A disabled default persistence cannot be re-enabled per call.
    pub fn resolve(&self, defaults: &CacheSettings) -> CacheSettings {
        CacheSettings {
            ttl_ms: self.ttl_ms.unwrap_or(defaults.ttl_ms),
            max_size: self.max_size.unwrap_or(defaults.max_size),
            max_entries: self.max_entries.unwrap_or(defaults.max_entries),
            persist: defaults.persist && self.persist.unwrap_or(true),
        }
    }
}
