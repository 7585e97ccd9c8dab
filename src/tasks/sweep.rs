//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ResultCache;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task runs until aborted, sleeping for `interval` between sweeps and
/// taking the write lock only for the sweep itself.
///
/// # Returns
/// A JoinHandle the owning service aborts on dispose.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(ResultCache::new(settings, store, clock)));
/// let sweeper = spawn_sweep_task(cache.clone(), Duration::from_secs(300));
/// // Later, during teardown:
/// sweeper.abort();
/// ```
pub fn spawn_sweep_task(cache: Arc<RwLock<ResultCache>>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting cache TTL sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.clear_expired()
            };

            if removed > 0 {
                info!(removed, "TTL sweep removed expired entries");
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}
