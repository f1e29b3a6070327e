pub mod memory;
pub mod redis;

pub use memory::MemoryCacheService;
pub use redis::RedisCacheService;

use crate::models::Way;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Way lists keyed by [`road_cache_key`].
///
/// Backend failures are logged and read as misses; the cache never fails a
/// request.
#[async_trait]
pub trait RoadCache: Send + Sync {
    async fn lookup(&self, key: &str) -> Option<Vec<Way>>;
    async fn store(&self, key: &str, ways: &[Way]);
    async fn stats(&self) -> CacheStats;
    async fn ping(&self) -> bool;
    fn backend(&self) -> &'static str;
}

/// Cache key for the ways of a road name.
///
/// Overpass matches names exactly, so the key is case-sensitive; only
/// surrounding whitespace is ignored.
pub fn road_cache_key(name: &str) -> String {
    let mut hasher = DefaultHasher::new();
    name.trim().hash(&mut hasher);
    format!("roads:name:{:x}", hasher.finish())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Percentage of lookups answered from the cache
    pub hit_rate: f64,
    pub connected: bool,
}

impl CacheStats {
    pub fn from_counts(hits: u64, misses: u64) -> Self {
        let lookups = hits + misses;
        CacheStats {
            hits,
            misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 * 100.0 / lookups as f64
            },
            connected: true,
        }
    }

    pub fn disconnected() -> Self {
        CacheStats {
            connected: false,
            ..CacheStats::from_counts(0, 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_road_cache_key_consistency() {
        assert_eq!(road_cache_key("EDSA"), road_cache_key("EDSA"));
        assert_eq!(road_cache_key("  EDSA "), road_cache_key("EDSA"));
        assert!(road_cache_key("EDSA").starts_with("roads:name:"));
    }

    #[test]
    fn test_road_cache_key_case_sensitive() {
        assert_ne!(road_cache_key("EDSA"), road_cache_key("edsa"));
        assert_ne!(road_cache_key("Aurora Boulevard"), road_cache_key("Aurora Blvd"));
    }

    #[test]
    fn test_hit_rate() {
        assert_eq!(CacheStats::from_counts(0, 0).hit_rate, 0.0);
        assert_eq!(CacheStats::from_counts(3, 1).hit_rate, 75.0);
        assert!(!CacheStats::disconnected().connected);
    }
}
