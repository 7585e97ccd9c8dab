//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CacheSettings;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in milliseconds for entries without an explicit TTL
    pub default_ttl_ms: u64,
    /// Maximum resident payload size in bytes
    pub max_size: u64,
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
    /// Directory backing the persisted cache slot
    pub store_dir: PathBuf,
    /// Whether mutations are written to the backing store
    pub persistence_enabled: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SCANNER_CACHE_TTL_MS` - Default TTL in milliseconds (default: 24 hours)
    /// - `SCANNER_CACHE_MAX_SIZE` - Maximum resident bytes (default: 50 MiB)
    /// - `SCANNER_CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `SCANNER_CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 300)
    /// - `SCANNER_CACHE_DIR` - Backing store directory (default: `.scanner_cache`)
    /// - `SCANNER_CACHE_PERSIST` - `true` or `false` (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl_ms: env::var("SCANNER_CACHE_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl_ms),
            max_size: env::var("SCANNER_CACHE_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_size),
            max_entries: env::var("SCANNER_CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_entries),
            sweep_interval: env::var("SCANNER_CACHE_SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval),
            store_dir: env::var("SCANNER_CACHE_DIR")
                .ok()
                .map(PathBuf::from)
                .unwrap_or(defaults.store_dir),
            persistence_enabled: env::var("SCANNER_CACHE_PERSIST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.persistence_enabled),
        }
    }

    /// Defaults that per-call cache options are merged over.
    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            ttl_ms: self.default_ttl_ms,
            max_size: self.max_size,
            max_entries: self.max_entries,
            persist: self.persistence_enabled,
        }
    }

    /// Sweep interval as a Duration.
    pub fn sweep_period(&self) -> Duration {
        Duration::from_secs(self.sweep_interval.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_ms: 24 * 60 * 60 * 1000,
            max_size: 50 * 1024 * 1024,
            max_entries: 1000,
            sweep_interval: 300,
            store_dir: PathBuf::from(".scanner_cache"),
            persistence_enabled: true,
        }
    }
}
