use crate::cache::{CacheStats, RoadCache};
use crate::error::{AppError, Result};
use crate::models::Way;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Road cache shared between instances through Redis. Ways are stored as
/// JSON strings with a per-key expiry.
pub struct RedisCacheService {
    connection: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisCacheService {
    pub async fn new(redis_url: &str, ttl_seconds: u64) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::Cache(format!("invalid Redis URL {}: {}", redis_url, e)))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Cache(format!("Redis unreachable: {}", e)))?;

        tracing::info!("Road cache connected to Redis (ttl {}s)", ttl_seconds);
        Ok(RedisCacheService {
            connection,
            ttl_seconds,
        })
    }
}

#[async_trait]
impl RoadCache for RedisCacheService {
    async fn lookup(&self, key: &str) -> Option<Vec<Way>> {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<Option<String>> = conn.get(key).await;
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, "Redis GET failed: {}", e);
                None
            }
        };

        let ways = raw.and_then(|json| {
            serde_json::from_str::<Vec<Way>>(&json)
                .map_err(|e| tracing::warn!(key, "Discarding unreadable cache entry: {}", e))
                .ok()
        });
        tracing::debug!(key, hit = ways.is_some(), "road cache lookup");
        ways
    }

    async fn store(&self, key: &str, ways: &[Way]) {
        let json = match serde_json::to_string(ways) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, "Could not encode ways for cache: {}", e);
                return;
            }
        };

        let mut conn = self.connection.clone();
        let result: redis::RedisResult<()> = conn.set_ex(key, json, self.ttl_seconds).await;
        if let Err(e) = result {
            tracing::warn!(key, "Redis SETEX failed: {}", e);
        }
    }

    async fn stats(&self) -> CacheStats {
        let mut conn = self.connection.clone();
        let info: redis::RedisResult<String> =
            redis::cmd("INFO").arg("stats").query_async(&mut conn).await;
        match info {
            Ok(info) => CacheStats::from_counts(
                info_field(&info, "keyspace_hits"),
                info_field(&info, "keyspace_misses"),
            ),
            Err(e) => {
                tracing::warn!("Redis INFO failed: {}", e);
                CacheStats::disconnected()
            }
        }
    }

    async fn ping(&self) -> bool {
        let mut conn = self.connection.clone();
        let pong: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        pong.is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

/// Numeric `field:value` line from an `INFO` reply; 0 when absent.
fn info_field(info: &str, field: &str) -> u64 {
    info.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| *name == field)
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}
