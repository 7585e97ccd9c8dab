//! Scanner Resilience - result caching and error recovery for a document scanner
//!
//! Provides a bounded, persisted cache for OCR and image-processing results
//! and a strategy-driven recovery service for classified failures.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod recovery;
pub mod tasks;

pub use cache::{CacheOptions, ResultCache, ResultCacheService};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{CacheError, RecoveryError};
pub use recovery::{ClassifiableError, ErrorRecoveryService, RecoveryContext, RecoveryResult};
pub use tasks::spawn_sweep_task;
