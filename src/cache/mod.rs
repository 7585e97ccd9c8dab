//! Cache Module
//!
//! Provides in-memory result caching with TTL expiration, frequency-ranked
//! eviction, and persistence to a local key-value store.

mod entry;
mod eviction;
pub mod keys;
pub mod persistence;
mod service;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, CacheOptions, CacheSettings};
pub use keys::ContentInfo;
pub use persistence::{FileStore, KeyValueStore, MemoryStore, PERSISTENCE_KEY};
pub use service::ResultCacheService;
pub use stats::{CacheCounters, CacheStats, TopEntry};
pub use store::{CacheExport, CacheLookup, MissReason, ResultCache};
