use crate::cache::{CacheStats, RoadCache};
use crate::models::Way;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Process-local road cache on moka, bounded by entry count and TTL.
pub struct MemoryCacheService {
    entries: Cache<String, Arc<[Way]>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryCacheService {
    pub fn new(ttl_seconds: u64, max_entries: u64) -> Self {
        MemoryCacheService {
            entries: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(Duration::from_secs(ttl_seconds))
                .build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl RoadCache for MemoryCacheService {
    async fn lookup(&self, key: &str) -> Option<Vec<Way>> {
        let found = self.entries.get(key).await;
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(key, hit = found.is_some(), "road cache lookup");
        found.map(|ways| ways.to_vec())
    }

    async fn store(&self, key: &str, ways: &[Way]) {
        self.entries.insert(key.to_string(), Arc::from(ways)).await;
        tracing::debug!(key, ways = ways.len(), "road cache store");
    }

    async fn stats(&self) -> CacheStats {
        CacheStats::from_counts(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    async fn ping(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
