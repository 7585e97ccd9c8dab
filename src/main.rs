//! Scanner cache maintenance tool.
//!
//! Opens the persisted result cache, sweeps expired entries and prints a
//! JSON snapshot of what remains.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scanner_resilience::cache::FileStore;
use scanner_resilience::{Config, ResultCacheService};

/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the backing store and load the cache
/// 4. Sweep expired entries
/// 5. Print the cache export and dispose
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scanner_resilience=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, max_size={}, default_ttl={}ms, dir={}",
        config.max_entries,
        config.max_size,
        config.default_ttl_ms,
        config.store_dir.display()
    );

    let store = FileStore::open(&config.store_dir)
        .with_context(|| format!("opening cache store at {}", config.store_dir.display()))?;
    let service = ResultCacheService::from_config(&config, Arc::new(store));

    let removed = service.clear_expired().await;
    info!(removed, "Expired entries swept");

    let export = service.export_cache().await;
    let json = serde_json::to_string_pretty(&export).context("serializing cache export")?;
    println!("{}", json);

    service.dispose().await;
    Ok(())
}
