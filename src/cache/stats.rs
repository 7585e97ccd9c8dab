//! Cache Statistics Module
//!
//! Running hit/miss/eviction counters and the derived snapshot reported by
//! `get_stats`.

use serde::Serialize;

use crate::cache::CacheEntry;

// == Cache Counters ==
/// Counters that live for the lifetime of the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheCounters {
    /// Successful lookups
    pub hits: u64,
    /// Lookups that found nothing usable
    pub misses: u64,
    /// Entries removed to satisfy capacity bounds
    pub evictions: u64,
}

impl CacheCounters {
    // == Constructor ==
    /// Creates a new CacheCounters with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Returns misses / (hits + misses), or 0.0 if no lookups have been made.
    pub fn miss_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.misses as f64 / total as f64
        }
    }
}

// == Cache Stats ==
/// Point-in-time view of the cache, computed over live entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub total_entries: usize,
    pub total_size: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
    /// Creation time of the oldest live entry, 0 when empty
    pub oldest_entry: u64,
    /// Creation time of the newest live entry, 0 when empty
    pub newest_entry: u64,
    pub average_access_count: f64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Builds a snapshot from the live entries and the running counters.
    pub fn collect<'a>(
        live: impl IntoIterator<Item = &'a CacheEntry>,
        counters: &CacheCounters,
    ) -> Self {
        let mut total_entries = 0usize;
        let mut total_size = 0u64;
        let mut total_access = 0u64;
        let mut oldest: Option<u64> = None;
        let mut newest: Option<u64> = None;

        for entry in live {
            total_entries += 1;
            total_size += entry.size;
            total_access += entry.access_count;
            oldest = Some(oldest.map_or(entry.timestamp, |t| t.min(entry.timestamp)));
            newest = Some(newest.map_or(entry.timestamp, |t| t.max(entry.timestamp)));
        }

        let average_access_count = if total_entries == 0 {
            0.0
        } else {
            total_access as f64 / total_entries as f64
        };

        Self {
            total_entries,
            total_size,
            hit_rate: counters.hit_rate(),
            miss_rate: counters.miss_rate(),
            oldest_entry: oldest.unwrap_or(0),
            newest_entry: newest.unwrap_or(0),
            average_access_count,
            hits: counters.hits,
            misses: counters.misses,
            evictions: counters.evictions,
        }
    }
}

// == Top Entry ==
/// One row of the most-accessed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEntry {
    pub key: String,
    pub access_count: u64,
    pub size: u64,
    pub last_accessed: u64,
}

impl From<&CacheEntry> for TopEntry {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            key: entry.key.clone(),
            access_count: entry.access_count,
            size: entry.size,
            last_accessed: entry.last_accessed,
        }
    }
}
