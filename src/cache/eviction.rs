//! Eviction Ranking Module
//!
//! Orders entries for least-frequently-used eviction and for the
//! most-accessed report.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::cache::CacheEntry;

// == Eviction Order ==
/// Orders entries from first-to-evict to last-to-evict.
///
/// Lowest `access_count` first, then oldest `last_accessed`, then earliest
/// insertion.
pub fn eviction_order(a: &CacheEntry, b: &CacheEntry) -> Ordering {
    a.access_count
        .cmp(&b.access_count)
        .then(a.last_accessed.cmp(&b.last_accessed))
        .then(a.seq.cmp(&b.seq))
}

// == Popularity Order ==
/// Orders entries from most to least accessed, most recently read first on ties.
pub fn popularity_order(a: &CacheEntry, b: &CacheEntry) -> Ordering {
    b.access_count
        .cmp(&a.access_count)
        .then(b.last_accessed.cmp(&a.last_accessed))
        .then(a.key.cmp(&b.key))
}

// == Pick Victim ==
/// Returns the map key of the next entry to evict, or None if the map is empty.
pub fn pick_victim(entries: &HashMap<String, CacheEntry>) -> Option<String> {
    entries
        .iter()
        .min_by(|(_, a), (_, b)| eviction_order(a, b))
        .map(|(key, _)| key.clone())
}
