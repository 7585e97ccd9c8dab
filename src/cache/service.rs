//! Result Cache Service
//!
//! The shared, async-facing cache handle used by scanner pipelines. Owns the
//! background TTL sweep for its lifetime.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::keys::{self, ContentInfo};
use crate::cache::persistence::KeyValueStore;
use crate::cache::{CacheExport, CacheLookup, CacheOptions, CacheStats, ResultCache, TopEntry};
use crate::clock::SystemClock;
use crate::config::Config;
use crate::models::{OcrResult, ProcessedDocument};
use crate::tasks::spawn_sweep_task;

/// Shared cache for OCR results, processed documents and image transforms.
///
/// Construct once at startup and hand out an `Arc` to every consumer. Must be
/// created inside a tokio runtime because it spawns the sweep task.
#[derive(Debug)]
pub struct ResultCacheService {
    cache: Arc<RwLock<ResultCache>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl ResultCacheService {
    // == Constructors ==
    /// Wraps `cache` and starts sweeping expired entries every `sweep_interval`.
    pub fn new(cache: ResultCache, sweep_interval: Duration) -> Self {
        let cache = Arc::new(RwLock::new(cache));
        let sweeper = spawn_sweep_task(cache.clone(), sweep_interval);
        Self {
            cache,
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    /// Builds the service from configuration with wall-clock time.
    pub fn from_config(config: &Config, store: Arc<dyn KeyValueStore>) -> Self {
        let cache = ResultCache::new(config.cache_settings(), store, Arc::new(SystemClock));
        Self::new(cache, config.sweep_period())
    }

    // == Key Generation ==
    pub fn generate_ocr_key<O: Serialize + ?Sized>(
        &self,
        content: &ContentInfo,
        options: &O,
    ) -> String {
        keys::ocr_key(content, options)
    }

    pub fn generate_document_key(&self, document_id: &str, version: Option<&str>) -> String {
        keys::document_key(document_id, version)
    }

    pub fn generate_image_processing_key<P: Serialize + ?Sized>(
        &self,
        content: &ContentInfo,
        operation: &str,
        params: &P,
    ) -> String {
        keys::image_processing_key(content, operation, params)
    }

    // == OCR Results ==
    pub async fn cache_ocr_result(&self, key: &str, result: &OcrResult, options: CacheOptions) {
        if self.store_payload(key, result, options).await {
            info!(key, provider = ?result.provider, "OCR result cached");
        }
    }

    pub async fn get_cached_ocr_result(&self, key: &str) -> CacheLookup<OcrResult> {
        let lookup = self.cache.write().await.get::<OcrResult>(key);
        match &lookup {
            CacheLookup::Hit(result) => {
                info!(key, provider = ?result.provider, "OCR result cache hit")
            }
            CacheLookup::Miss(reason) => debug!(key, ?reason, "OCR result cache miss"),
        }
        lookup
    }

    // == Processed Documents ==
    pub async fn cache_processed_document(
        &self,
        key: &str,
        document: &ProcessedDocument,
        options: CacheOptions,
    ) {
        if self.store_payload(key, document, options).await {
            info!(key, document_id = %document.id, "Processed document cached");
        }
    }

    pub async fn get_cached_processed_document(&self, key: &str) -> CacheLookup<ProcessedDocument> {
        let lookup = self.cache.write().await.get::<ProcessedDocument>(key);
        match &lookup {
            CacheLookup::Hit(document) => {
                info!(key, document_id = %document.id, "Processed document cache hit")
            }
            CacheLookup::Miss(reason) => debug!(key, ?reason, "Processed document cache miss"),
        }
        lookup
    }

    // == Image Processing Results ==
    pub async fn cache_image_processing_result<T: Serialize + ?Sized>(
        &self,
        key: &str,
        result: &T,
        options: CacheOptions,
    ) {
        if self.store_payload(key, result, options).await {
            info!(key, "Image processing result cached");
        }
    }

    pub async fn get_cached_image_processing_result<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> CacheLookup<T> {
        let lookup = self.cache.write().await.get::<T>(key);
        match &lookup {
            CacheLookup::Hit(_) => info!(key, "Image processing result cache hit"),
            CacheLookup::Miss(reason) => debug!(key, ?reason, "Image processing result cache miss"),
        }
        lookup
    }

    // == Entry Management ==
    pub async fn has(&self, key: &str) -> bool {
        self.cache.write().await.has(key)
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.cache.write().await.delete(key)
    }

    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    pub async fn clear_expired(&self) -> usize {
        self.cache.write().await.clear_expired()
    }

    // == Reporting ==
    pub async fn get_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    pub async fn get_top_entries(&self, limit: usize) -> Vec<TopEntry> {
        self.cache.read().await.top_entries(limit)
    }

    pub async fn export_cache(&self) -> CacheExport {
        self.cache.read().await.export()
    }

    /// Zeroes the hit, miss and eviction counters.
    pub async fn reset_stats(&self) {
        self.cache.write().await.reset_stats();
    }

    // == Lifecycle ==
    /// Pulls persisted entries written by other instances into memory.
    ///
    /// Best effort: read failures are logged and yield 0.
    pub async fn preload_frequent_results(&self) -> usize {
        let added = self.cache.write().await.merge_persisted();
        info!(added, "Cache preload completed");
        added
    }

    /// Persists the current map and stops the sweep task.
    pub async fn dispose(&self) {
        self.stop_sweeper();
        self.cache.write().await.flush();
    }

    fn stop_sweeper(&self) {
        let handle = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            debug!("Cache sweep task stopped");
        }
    }

    /// Serializes and inserts a payload. Returns whether it was stored.
    async fn store_payload<T: Serialize + ?Sized>(
        &self,
        key: &str,
        payload: &T,
        options: CacheOptions,
    ) -> bool {
        let data = match serde_json::to_value(payload) {
            Ok(data) => data,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize payload, not caching");
                return false;
            }
        };

        let resident = self
            .cache
            .write()
            .await
            .insert(key.to_string(), data, &options);
        if !resident {
            debug!(key, "Payload evicted immediately to satisfy capacity bounds");
        }
        resident
    }
}

impl Drop for ResultCacheService {
    fn drop(&mut self) {
        self.stop_sweeper();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheSettings, MemoryStore, MissReason, PERSISTENCE_KEY};
    use crate::clock::ManualClock;
    use crate::models::OcrProvider;
    use serde_json::json;

    fn service_with_clock() -> (ResultCacheService, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(10_000));
        let cache = ResultCache::new(CacheSettings::default(), store.clone(), clock.clone());
        (
            ResultCacheService::new(cache, Duration::from_secs(300)),
            store,
            clock,
        )
    }

    fn ocr_result() -> OcrResult {
        OcrResult {
            text: "Sample extracted text".to_string(),
            confidence: 0.95,
            provider: OcrProvider::OpenAI,
            processing_time: 1500,
            blocks: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_ocr_roundtrip_and_expiry() {
        let (service, _, clock) = service_with_clock();
        let options = CacheOptions::default().with_ttl_ms(1_000).with_max_entries(10);

        service.cache_ocr_result("ocr-key", &ocr_result(), options).await;
        assert_eq!(
            service.get_cached_ocr_result("ocr-key").await,
            CacheLookup::Hit(ocr_result())
        );

        clock.advance(1_500);
        assert_eq!(
            service.get_cached_ocr_result("ocr-key").await,
            CacheLookup::Miss(MissReason::Expired)
        );
    }

    #[tokio::test]
    async fn test_image_processing_result_is_typed() {
        #[derive(Debug, PartialEq, Serialize, serde::Deserialize)]
        struct Thumbnail {
            width: u32,
            height: u32,
        }

        let (service, _, _) = service_with_clock();
        let content = ContentInfo::from_bytes(b"png bytes", "image/png");
        let key =
            service.generate_image_processing_key(&content, "thumbnail", &json!({"max": 128}));

        service
            .cache_image_processing_result(
                &key,
                &Thumbnail {
                    width: 128,
                    height: 96,
                },
                CacheOptions::default(),
            )
            .await;

        let hit: CacheLookup<Thumbnail> = service.get_cached_image_processing_result(&key).await;
        assert_eq!(hit, CacheLookup::Hit(Thumbnail { width: 128, height: 96 }));
    }

    #[tokio::test]
    async fn test_dispose_flushes_and_stops_sweeper() {
        let (service, store, _) = service_with_clock();
        service
            .cache_ocr_result("k", &ocr_result(), CacheOptions::default().without_persistence())
            .await;
        assert!(store.get_item(PERSISTENCE_KEY).unwrap().is_none());

        service.dispose().await;

        assert!(store.get_item(PERSISTENCE_KEY).unwrap().is_some());
        assert!(service.sweeper.lock().unwrap().is_none());
        // Second dispose is harmless
        service.dispose().await;
    }

    #[tokio::test]
    async fn test_preload_pulls_persisted_entries() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(0));
        let writer = ResultCacheService::new(
            ResultCache::new(CacheSettings::default(), store.clone(), clock.clone()),
            Duration::from_secs(300),
        );
        let reader = ResultCacheService::new(
            ResultCache::new(CacheSettings::default(), store.clone(), clock.clone()),
            Duration::from_secs(300),
        );

        writer.cache_ocr_result("late", &ocr_result(), CacheOptions::default()).await;
        assert!(!reader.has("late").await);

        assert_eq!(reader.preload_frequent_results().await, 1);
        assert!(reader.has("late").await);
    }

    #[tokio::test]
    async fn test_export_contains_entries_and_counters() {
        let (service, _, _) = service_with_clock();
        let key = service.generate_document_key("doc-123", None);
        service
            .cache_image_processing_result(&key, &json!({"pages": 2}), CacheOptions::default())
            .await;
        let _ = service.get_cached_image_processing_result::<serde_json::Value>(&key).await;

        let export = service.export_cache().await;
        assert!(export.entries.contains_key("doc_doc-123_latest"));
        assert_eq!(export.stats.hits, 1);
        assert_eq!(export.cache_stats.total_entries, 1);
    }
}
