//! Cache-Consistency Layer
//!
//! A thin, typed wrapper over a TTL key/value store, used read-through and
//! write-invalidate in front of the database. Every operation is
//! best-effort and fail-open: a backend failure or timeout is reported as
//! "absent" on reads and logged-and-ignored on writes, so callers degrade
//! to the authoritative store instead of failing.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::time::timeout;

/// Upper bound on any single cache round-trip
const OP_TIMEOUT: Duration = Duration::from_millis(500);

/// Best-effort TTL cache. Implementations must never propagate backend
/// failures to the caller.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Value for `key`, or `None` on miss, failure, or timeout
    async fn get(&self, key: &str) -> Option<String>;
    /// Whether `key` is present; failure reads as absent
    async fn exists(&self, key: &str) -> bool;
    /// Store `value` under `key` for `ttl_secs`
    async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64);
    /// Drop `key`, forcing the next read to the authoritative source
    async fn delete(&self, key: &str);
}

/// Redis-backed cache over a multiplexed managed connection
#[derive(Clone)]
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let conn = redis::aio::ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match timeout(OP_TIMEOUT, conn.get::<_, Option<String>>(key)).await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                tracing::warn!(key, error = %e, "cache get failed, treating as miss");
                None
            }
            Err(_) => {
                tracing::warn!(key, "cache get timed out, treating as miss");
                None
            }
        }
    }

    async fn exists(&self, key: &str) -> bool {
        let mut conn = self.conn.clone();
        match timeout(OP_TIMEOUT, conn.exists::<_, bool>(key)).await {
            Ok(Ok(present)) => present,
            Ok(Err(e)) => {
                tracing::warn!(key, error = %e, "cache exists failed, treating as absent");
                false
            }
            Err(_) => false,
        }
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64) {
        let mut conn = self.conn.clone();
        match timeout(OP_TIMEOUT, conn.set_ex::<_, _, ()>(key, value, ttl_secs)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(key, error = %e, "cache set failed, skipping"),
            Err(_) => tracing::warn!(key, "cache set timed out, skipping"),
        }
    }

    async fn delete(&self, key: &str) {
        let mut conn = self.conn.clone();
        match timeout(OP_TIMEOUT, conn.del::<_, ()>(key)).await {
            Ok(Ok(())) => {}
            // The entry self-repairs once the TTL elapses
            Ok(Err(e)) => tracing::warn!(key, error = %e, "cache invalidation failed"),
            Err(_) => tracing::warn!(key, "cache invalidation timed out"),
        }
    }
}

/// Always-miss stub used when no cache backend is configured, and as the
/// degenerate implementation in tests. Every read is a miss; writes are
/// dropped.
pub struct NullCache;

#[async_trait]
impl Cache for NullCache {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn exists(&self, _key: &str) -> bool {
        false
    }

    async fn set_with_expiry(&self, _key: &str, _value: &str, _ttl_secs: u64) {}

    async fn delete(&self, _key: &str) {}
}
