//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with frequency-ranked eviction,
//! TTL expiration, and write-through persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::cache::eviction::{pick_victim, popularity_order};
use crate::cache::persistence::{clear_entries, load_entries, save_entries, KeyValueStore};
use crate::cache::{CacheCounters, CacheEntry, CacheOptions, CacheSettings, CacheStats, TopEntry};
use crate::clock::Clock;
use crate::error::CacheError;

// == Lookup Result ==
/// Why a lookup produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissReason {
    /// No entry under the key
    Absent,
    /// The entry outlived its TTL and was removed
    Expired,
    /// The payload did not match the requested type and was removed
    Undecodable,
}

/// Outcome of a cache read. A miss is never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<T> {
    Hit(T),
    Miss(MissReason),
}

impl<T> CacheLookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            CacheLookup::Hit(value) => Some(value),
            CacheLookup::Miss(_) => None,
        }
    }
}

// == Cache Export ==
/// Diagnostic dump of the whole cache.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheExport {
    pub entries: BTreeMap<String, CacheEntry>,
    pub stats: CacheCounters,
    pub cache_stats: CacheStats,
}

// == Result Cache ==
/// Single-owner cache state. Wrap in a lock to share it.
#[derive(Debug)]
pub struct ResultCache {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Running counters
    counters: CacheCounters,
    /// Limits applied when a call does not override them
    defaults: CacheSettings,
    /// Backing store for the persisted slot
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    /// Next insertion sequence number
    next_seq: u64,
}

impl ResultCache {
    // == Constructor ==
    /// Creates a cache and reloads whatever live entries the store holds.
    ///
    /// A corrupt persisted blob is removed and the cache starts empty. Any
    /// other read failure leaves the blob in place. Loaded entries are
    /// renumbered in their stored insertion order.
    pub fn new(
        defaults: CacheSettings,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let loaded = if defaults.persist {
            match load_entries(store.as_ref(), clock.now_ms()) {
                Ok(entries) => {
                    if !entries.is_empty() {
                        info!(entries = entries.len(), "Cache loaded from persistence");
                    }
                    entries
                }
                Err(CacheError::CorruptPersistence(reason)) => {
                    warn!(%reason, "Persisted cache is corrupt, discarding");
                    if let Err(e) = clear_entries(store.as_ref()) {
                        warn!(error = %e, "Failed to remove invalid cache blob");
                    }
                    HashMap::new()
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read persisted cache, starting empty");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        let mut ordered: Vec<(String, CacheEntry)> = loaded.into_iter().collect();
        ordered.sort_by(|(ka, a), (kb, b)| a.seq.cmp(&b.seq).then_with(|| ka.cmp(kb)));

        let mut entries = HashMap::with_capacity(ordered.len());
        let mut next_seq = 0u64;
        for (key, mut entry) in ordered {
            entry.seq = next_seq;
            next_seq += 1;
            entries.insert(key, entry);
        }

        Self {
            entries,
            counters: CacheCounters::new(),
            defaults,
            store,
            clock,
            next_seq,
        }
    }

    // == Insert ==
    /// Stores `data` under `key`, replacing any previous entry.
    ///
    /// Capacity is enforced after the insert, so the new entry itself may be
    /// the one evicted. Returns whether the entry is resident afterwards.
    pub fn insert(&mut self, key: String, data: Value, options: &CacheOptions) -> bool {
        let settings = options.resolve(&self.defaults);
        let now = self.clock.now_ms();

        let entry = CacheEntry::new(key.clone(), data, now, settings.ttl_ms, self.next_seq);
        self.next_seq += 1;
        self.entries.insert(key.clone(), entry);

        self.enforce_limits(settings.max_size, settings.max_entries);

        if settings.persist {
            self.persist();
        }

        self.entries.contains_key(&key)
    }

    // == Get ==
    /// Reads and decodes the payload under `key`.
    ///
    /// Expired entries count as misses and stay until the next sweep.
    /// Undecodable entries are removed and counted as misses.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> CacheLookup<T> {
        let now = self.clock.now_ms();

        let Some(entry) = self.entries.get_mut(key) else {
            self.counters.record_miss();
            return CacheLookup::Miss(MissReason::Absent);
        };

        if entry.is_expired(now) {
            self.counters.record_miss();
            return CacheLookup::Miss(MissReason::Expired);
        }

        match T::deserialize(&entry.data) {
            Ok(value) => {
                entry.touch(now);
                self.counters.record_hit();
                CacheLookup::Hit(value)
            }
            Err(e) => {
                warn!(key, error = %e, "Cached payload does not match requested type, dropping");
                self.entries.remove(key);
                self.counters.record_miss();
                CacheLookup::Miss(MissReason::Undecodable)
            }
        }
    }

    // == Has ==
    /// True iff a live entry exists. An expired entry is removed on the spot.
    pub fn has(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => return false,
        };

        if expired {
            self.entries.remove(key);
            return false;
        }

        if let Some(entry) = self.entries.get_mut(key) {
            entry.touch(now);
        }
        true
    }

    // == Delete ==
    /// Removes an entry. Returns true iff one was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed && self.defaults.persist {
            self.persist();
        }
        removed
    }

    // == Clear ==
    /// Drops every entry and the persisted slot. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = clear_entries(self.store.as_ref()) {
            warn!(error = %e, "Failed to clear cache persistence");
        }
        info!("Cache cleared");
    }

    // == Clear Expired ==
    /// Removes all expired entries and returns how many were removed.
    pub fn clear_expired(&mut self) -> usize {
        let removed = self.purge_expired();
        if removed > 0 {
            if self.defaults.persist {
                self.persist();
            }
            info!(count = removed, "Expired cache entries cleared");
        }
        removed
    }

    // == Stats ==
    /// Snapshot over live entries.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now_ms();
        CacheStats::collect(
            self.entries.values().filter(|e| !e.is_expired(now)),
            &self.counters,
        )
    }

    /// Zeroes hits, misses and evictions.
    pub fn reset_stats(&mut self) {
        self.counters = CacheCounters::new();
    }

    // == Top Entries ==
    /// Live entries ordered by access count, most recently read first on ties.
    pub fn top_entries(&self, limit: usize) -> Vec<TopEntry> {
        let now = self.clock.now_ms();
        let mut live: Vec<&CacheEntry> = self
            .entries
            .values()
            .filter(|e| !e.is_expired(now))
            .collect();
        live.sort_by(|a, b| popularity_order(a, b));
        live.into_iter().take(limit).map(TopEntry::from).collect()
    }

    // == Export ==
    pub fn export(&self) -> CacheExport {
        CacheExport {
            entries: self
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            stats: self.counters,
            cache_stats: self.stats(),
        }
    }

    // == Merge Persisted ==
    /// Pulls live entries from the store that are not resident yet.
    ///
    /// Resident entries win over persisted ones. Returns how many were added.
    pub fn merge_persisted(&mut self) -> usize {
        if !self.defaults.persist {
            return 0;
        }

        let persisted = match load_entries(self.store.as_ref(), self.clock.now_ms()) {
            Ok(persisted) => persisted,
            Err(e) => {
                warn!(error = %e, "Skipping warm-up, persisted cache unreadable");
                return 0;
            }
        };

        let mut added = 0;
        for (key, mut entry) in persisted {
            if self.entries.contains_key(&key) {
                continue;
            }
            entry.seq = self.next_seq;
            self.next_seq += 1;
            self.entries.insert(key, entry);
            added += 1;
        }

        if added > 0 {
            self.enforce_limits(self.defaults.max_size, self.defaults.max_entries);
        }
        added
    }

    // == Flush ==
    /// Writes the current map to the store if persistence is enabled.
    pub fn flush(&mut self) {
        if self.defaults.persist {
            self.persist();
        }
    }

    // == Length ==
    /// Number of resident entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Internals ==
    fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }

    /// Evicts until both bounds hold. Expired entries go first and do not
    /// count as evictions.
    fn enforce_limits(&mut self, max_size: u64, max_entries: usize) {
        let over = |entries: &HashMap<String, CacheEntry>| {
            let total: u64 = entries.values().map(|e| e.size).sum();
            total > max_size || entries.len() > max_entries
        };

        if !over(&self.entries) {
            return;
        }
        self.purge_expired();

        let mut total_size: u64 = self.entries.values().map(|e| e.size).sum();
        let mut evicted = 0usize;
        while total_size > max_size || self.entries.len() > max_entries {
            let Some(victim) = pick_victim(&self.entries) else {
                break;
            };
            let Some(entry) = self.entries.remove(&victim) else {
                break;
            };
            total_size = total_size.saturating_sub(entry.size);
            evicted += 1;
            self.counters.record_eviction();
            debug!(key = %victim, size = entry.size, "Evicted cache entry");
        }

        if evicted > 0 {
            info!(evicted, max_size, max_entries, "Cache eviction to satisfy capacity bounds");
        }
    }

    /// Writes the map; on failure sweeps expired entries and retries once.
    fn persist(&mut self) {
        let Err(e) = save_entries(self.store.as_ref(), &self.entries) else {
            return;
        };
        warn!(error = %e, "Failed to save cache to persistence, sweeping expired entries");

        let removed = self.purge_expired();
        if let Err(e) = save_entries(self.store.as_ref(), &self.entries) {
            error!(error = %e, removed, "Failed to save cache after cleanup");
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::persistence::{MemoryStore, PERSISTENCE_KEY};
    use crate::clock::ManualClock;
    use serde_json::json;

    fn setup(defaults: CacheSettings) -> (ResultCache, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = ResultCache::new(defaults, store.clone(), clock.clone());
        (cache, store, clock)
    }

    fn opts() -> CacheOptions {
        CacheOptions::default()
    }

    #[test]
    fn test_store_new() {
        let (cache, _, _) = setup(CacheSettings::default());
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_and_get() {
        let (mut cache, _, _) = setup(CacheSettings::default());

        assert!(cache.insert("k".to_string(), json!({"text": "hello"}), &opts()));
        let value: CacheLookup<Value> = cache.get("k");

        assert_eq!(value, CacheLookup::Hit(json!({"text": "hello"})));
    }

    #[test]
    fn test_get_nonexistent() {
        let (mut cache, _, _) = setup(CacheSettings::default());

        let result: CacheLookup<Value> = cache.get("nope");
        assert_eq!(result, CacheLookup::Miss(MissReason::Absent));
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_ttl_expiration() {
        let (mut cache, _, clock) = setup(CacheSettings::default());
        cache.insert("k".to_string(), json!(1), &opts().with_ttl_ms(1_000));

        assert!(cache.has("k"));
        clock.advance(1_000);

        assert!(!cache.has("k"));
        assert!(cache.is_empty(), "has() removes expired entries");
        let result: CacheLookup<Value> = cache.get("k");
        assert_eq!(result, CacheLookup::Miss(MissReason::Absent));
    }

    #[test]
    fn test_get_expired_reports_expired() {
        let (mut cache, _, clock) = setup(CacheSettings::default());
        cache.insert("k".to_string(), json!(1), &opts().with_ttl_ms(10));
        clock.advance(11);

        let result: CacheLookup<u32> = cache.get("k");
        assert_eq!(result, CacheLookup::Miss(MissReason::Expired));
        assert_eq!(cache.stats().misses, 1);

        // Left for the sweep
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.clear_expired(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_undecodable_payload_is_a_miss() {
        let (mut cache, _, _) = setup(CacheSettings::default());
        cache.insert("k".to_string(), json!("not a number"), &opts());

        let result: CacheLookup<u32> = cache.get("k");
        assert_eq!(result, CacheLookup::Miss(MissReason::Undecodable));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite() {
        let (mut cache, _, _) = setup(CacheSettings::default());
        cache.insert("k".to_string(), json!(1), &opts());
        cache.insert("k".to_string(), json!(2), &opts());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get::<u32>("k"), CacheLookup::Hit(2));
    }

    #[test]
    fn test_delete() {
        let (mut cache, _, _) = setup(CacheSettings::default());
        cache.insert("k".to_string(), json!(1), &opts());

        assert!(cache.delete("k"));
        assert!(!cache.delete("k"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_least_frequently_used_is_evicted() {
        let (mut cache, _, clock) = setup(CacheSettings::default());
        let bounded = opts().with_max_entries(2);

        cache.insert("first".to_string(), json!(1), &bounded);
        clock.advance(1);
        cache.insert("second".to_string(), json!(2), &bounded);
        clock.advance(1);
        assert!(cache.get::<u32>("first").is_hit());
        clock.advance(1);
        cache.insert("third".to_string(), json!(3), &bounded);

        assert_eq!(cache.len(), 2);
        assert!(cache.has("first"));
        assert!(!cache.has("second"));
        assert!(cache.has("third"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_ties_evict_earliest_insert_on_frozen_clock() {
        let (mut cache, _, _) = setup(CacheSettings::default());
        let bounded = opts().with_max_entries(2);

        cache.insert("a".to_string(), json!(1), &bounded);
        cache.insert("b".to_string(), json!(2), &bounded);
        cache.insert("c".to_string(), json!(3), &bounded);

        assert!(!cache.has("a"));
        assert!(cache.has("b"));
        assert!(cache.has("c"));
    }

    #[test]
    fn test_new_entry_can_evict_itself() {
        let (mut cache, _, clock) = setup(CacheSettings::default());

        cache.insert("popular".to_string(), json!("x"), &opts());
        assert!(cache.get::<String>("popular").is_hit());
        clock.advance(10);

        // Oversized for the size bound together with "popular"
        let big = json!("y".repeat(100));
        let resident = cache.insert("big".to_string(), big, &opts().with_max_size(60));

        assert!(!resident, "never-read newcomer is the least valuable entry");
        assert!(cache.has("popular"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_size_bound_evicts_until_satisfied() {
        let (mut cache, _, clock) = setup(CacheSettings::default());
        // Each payload serializes to 12 bytes
        for key in ["a", "b", "c"] {
            cache.insert(key.to_string(), json!("0123456789"), &opts());
            clock.advance(1);
        }
        cache.insert("d".to_string(), json!("0123456789"), &opts().with_max_size(24));

        assert_eq!(cache.len(), 2);
        assert!(cache.stats().total_size <= 24);
        assert!(cache.has("c"));
        assert!(cache.has("d"));
    }

    #[test]
    fn test_clear_expired() {
        let (mut cache, _, clock) = setup(CacheSettings::default());
        cache.insert("short".to_string(), json!(1), &opts().with_ttl_ms(100));
        cache.insert("long".to_string(), json!(2), &opts().with_ttl_ms(10_000));
        clock.advance(500);

        assert_eq!(cache.clear_expired(), 1);
        assert_eq!(cache.clear_expired(), 0);
        assert!(cache.has("long"));
    }

    #[test]
    fn test_stats_count_only_live_entries() {
        let (mut cache, _, clock) = setup(CacheSettings::default());
        cache.insert("short".to_string(), json!(1), &opts().with_ttl_ms(100));
        cache.insert("long".to_string(), json!(2), &opts().with_ttl_ms(10_000));
        assert!(cache.get::<u32>("long").is_hit());
        let _ = cache.get::<u32>("missing");
        clock.advance(500);

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate, 0.5);
    }

    #[test]
    fn test_top_entries() {
        let (mut cache, _, clock) = setup(CacheSettings::default());
        for key in ["a", "b", "c"] {
            cache.insert(key.to_string(), json!(0), &opts());
        }
        for _ in 0..3 {
            let _ = cache.get::<u32>("b");
        }
        let _ = cache.get::<u32>("a");
        clock.advance(5);
        let _ = cache.get::<u32>("c");

        let top = cache.top_entries(2);
        let keys: Vec<&str> = top.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "c"]);
        assert_eq!(top[0].access_count, 3);
    }

    #[test]
    fn test_insert_persists_and_reloads() {
        let (mut cache, store, clock) = setup(CacheSettings::default());
        cache.insert("k".to_string(), json!({"text": "kept"}), &opts());

        assert!(store.get_item(PERSISTENCE_KEY).unwrap().is_some());

        let mut reloaded = ResultCache::new(CacheSettings::default(), store.clone(), clock.clone());
        assert_eq!(
            reloaded.get::<Value>("k"),
            CacheLookup::Hit(json!({"text": "kept"}))
        );
    }

    #[test]
    fn test_per_call_persistence_opt_out() {
        let (mut cache, store, _) = setup(CacheSettings::default());
        cache.insert("k".to_string(), json!(1), &opts().without_persistence());

        assert!(store.get_item(PERSISTENCE_KEY).unwrap().is_none());
        assert!(cache.has("k"));
    }

    #[test]
    fn test_clear_removes_slot_but_keeps_counters() {
        let (mut cache, store, _) = setup(CacheSettings::default());
        cache.insert("k".to_string(), json!(1), &opts());
        let _ = cache.get::<u32>("k");

        cache.clear();

        assert!(cache.is_empty());
        assert!(store.get_item(PERSISTENCE_KEY).unwrap().is_none());
        assert_eq!(cache.stats().hits, 1);

        cache.reset_stats();
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_corrupt_blob_is_discarded() {
        let store = Arc::new(MemoryStore::new().with_item(PERSISTENCE_KEY, "invalid json"));
        let clock = Arc::new(ManualClock::new(0));

        let cache = ResultCache::new(CacheSettings::default(), store.clone(), clock);

        assert!(cache.is_empty());
        assert!(store.get_item(PERSISTENCE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_mismatched_entry_key_is_evictable() {
        let mut stored = HashMap::new();
        stored.insert(
            "alias".to_string(),
            CacheEntry::new("real".to_string(), json!("old"), 0, 10_000, 0),
        );
        let blob = serde_json::to_string(&stored).unwrap();
        let store = Arc::new(MemoryStore::new().with_item(PERSISTENCE_KEY, &blob));
        let mut cache =
            ResultCache::new(CacheSettings::default(), store, Arc::new(ManualClock::new(0)));

        cache.insert("new".to_string(), json!("fresh"), &opts().with_max_entries(1));

        assert_eq!(cache.len(), 1);
        assert!(!cache.has("alias"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_loaded_entries_are_renumbered() {
        let mut stored = HashMap::new();
        stored.insert(
            "last".to_string(),
            CacheEntry::new("last".to_string(), json!(1), 0, 10_000, u64::MAX),
        );
        stored.insert(
            "first".to_string(),
            CacheEntry::new("first".to_string(), json!(2), 0, 10_000, 7),
        );
        let blob = serde_json::to_string(&stored).unwrap();
        let store = Arc::new(MemoryStore::new().with_item(PERSISTENCE_KEY, &blob));
        let mut cache =
            ResultCache::new(CacheSettings::default(), store, Arc::new(ManualClock::new(0)));

        assert_eq!(cache.entries["first"].seq, 0);
        assert_eq!(cache.entries["last"].seq, 1);
        assert_eq!(cache.next_seq, 2);

        // Insertion order still breaks the tie: "first" goes before "last"
        cache.insert("new".to_string(), json!(3), &opts().with_max_entries(2));
        assert!(!cache.has("first"));
        assert!(cache.has("last"));
    }

    #[derive(Debug, Default)]
    struct UnreadableStore {
        removed: std::sync::Mutex<Vec<String>>,
    }

    impl KeyValueStore for UnreadableStore {
        fn get_item(&self, _key: &str) -> crate::error::Result<Option<String>> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked").into())
        }

        fn set_item(&self, _key: &str, _value: &str) -> crate::error::Result<()> {
            Ok(())
        }

        fn remove_item(&self, key: &str) -> crate::error::Result<()> {
            self.removed.lock().unwrap().push(key.to_string());
            Ok(())
        }

        fn keys(&self) -> crate::error::Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_unreadable_store_keeps_blob() {
        let store = Arc::new(UnreadableStore::default());

        let clock = Arc::new(ManualClock::new(0));
        let cache = ResultCache::new(CacheSettings::default(), store.clone(), clock);

        assert!(cache.is_empty());
        assert!(store.removed.lock().unwrap().is_empty());
    }

    #[test]
    fn test_quota_failure_sweeps_and_retries() {
        let store = Arc::new(MemoryStore::new().with_quota(300));
        let clock = Arc::new(ManualClock::new(0));
        let mut cache = ResultCache::new(CacheSettings::default(), store.clone(), clock.clone());

        // Too large for the quota on its own; the write is swallowed
        cache.insert("old".to_string(), json!("x".repeat(500)), &opts().with_ttl_ms(100));
        assert!(store.get_item(PERSISTENCE_KEY).unwrap().is_none());
        assert!(cache.has("old"));

        clock.advance(200);
        cache.insert("new".to_string(), json!("y"), &opts());

        let reloaded = ResultCache::new(CacheSettings::default(), store.clone(), clock.clone());
        assert_eq!(reloaded.len(), 1);
        assert_eq!(cache.len(), 1, "sweep before retry removed the expired entry");
    }

    #[test]
    fn test_merge_persisted_keeps_resident_entries() {
        let (mut writer, store, clock) = setup(CacheSettings::default());
        writer.insert("shared".to_string(), json!("from writer"), &opts());
        writer.insert("extra".to_string(), json!("only persisted"), &opts());

        let mut reader = ResultCache::new(
            CacheSettings {
                persist: true,
                ..CacheSettings::default()
            },
            Arc::new(MemoryStore::new()),
            clock.clone(),
        );
        reader.insert("shared".to_string(), json!("resident"), &opts().without_persistence());
        reader.store = store.clone();

        assert_eq!(reader.merge_persisted(), 1);
        assert_eq!(reader.get::<String>("shared"), CacheLookup::Hit("resident".to_string()));
        assert!(reader.has("extra"));
    }

    #[test]
    fn test_persistence_disabled() {
        let defaults = CacheSettings {
            persist: false,
            ..CacheSettings::default()
        };
        let (mut cache, store, _) = setup(defaults);
        cache.insert("k".to_string(), json!(1), &opts());
        cache.flush();

        assert!(store.keys().unwrap().is_empty());
    }
}
