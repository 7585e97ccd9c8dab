//! Error types for the cache and recovery services
//!
//! Provides unified error handling using thiserror. None of these escape the
//! public cache API; they travel across the storage and handler trait seams.

use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by the cache layer and its storage backends.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Payload or options could not be (de)serialized
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backing store I/O failure
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Backing store refused the write because of its quota
    #[error("Storage quota exceeded: needed {needed} bytes, limit {limit} bytes")]
    QuotaExceeded { needed: usize, limit: usize },

    /// Persisted blob could not be parsed
    #[error("Corrupt persisted cache: {0}")]
    CorruptPersistence(String),
}

// == Recovery Error Enum ==
/// Errors raised while executing a single recovery action.
///
/// A handler returning one of these only fails that action; the next action in
/// the strategy still runs.
#[derive(Error, Debug)]
pub enum RecoveryError {
    /// No gate knows how to acquire the requested resource
    #[error("Permission type not supported")]
    PermissionUnsupported,

    /// Clearing caches or store keys failed
    #[error("Cache clear failed: {0}")]
    CacheClear(String),

    /// Any other handler failure
    #[error("Recovery handler failed: {0}")]
    Handler(String),
}

impl From<CacheError> for RecoveryError {
    fn from(err: CacheError) -> Self {
        RecoveryError::CacheClear(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
