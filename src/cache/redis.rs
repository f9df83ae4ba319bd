use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, error, trace, warn};

use super::{AliasCache, CacheLookup};
use crate::config::CacheConfig;
use crate::errors::{LinkmeterError, Result};
use crate::storage::AliasRecord;

/// Shared cache for multi-instance deployments.
///
/// Keys are `{key_prefix}{code}`, values the JSON-encoded alias record.
/// Every command runs under `op_timeout`; a timeout or connection error
/// drops the cached connection and reports a miss.
pub struct RedisAliasCache {
    client: redis::Client,
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
    ttl: u64,
    op_timeout: Duration,
}

impl RedisAliasCache {
    /// Open a client and verify the server answers `PING`.
    pub async fn connect(config: &CacheConfig) -> Result<Self> {
        let client = redis::Client::open(config.redis.url.as_str()).map_err(|e| {
            LinkmeterError::cache_connection(format!("Invalid Redis URL '{}': {}", config.redis.url, e))
        })?;

        let cache = Self::with_client(
            client,
            config.key_prefix.clone(),
            config.default_ttl,
            Duration::from_millis(config.redis.timeout_ms),
        );

        let mut conn = cache.get_connection().await.map_err(|e| {
            LinkmeterError::cache_connection(format!(
                "Cannot reach Redis at {}: {}",
                config.redis.url, e
            ))
        })?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| LinkmeterError::cache_connection(format!("Redis ping failed: {}", e)))?;
        debug!("Redis connection test successful: {}", pong);

        Ok(cache)
    }

    /// Build without contacting the server; the connection is opened lazily.
    pub fn with_client(
        client: redis::Client,
        key_prefix: String,
        ttl: u64,
        op_timeout: Duration,
    ) -> Self {
        Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix,
            ttl,
            op_timeout,
        }
    }

    async fn get_connection(&self) -> redis::RedisResult<MultiplexedConnection> {
        {
            let guard = self.connection.read().await;
            if let Some(ref conn) = *guard {
                return Ok(conn.clone());
            }
        }

        let mut guard = self.connection.write().await;
        if let Some(ref conn) = *guard {
            return Ok(conn.clone());
        }

        let conn = self.client.get_multiplexed_async_connection().await?;
        *guard = Some(conn.clone());
        debug!("Redis connection established");
        Ok(conn)
    }

    async fn reset_connection(&self) {
        *self.connection.write().await = None;
        debug!("Redis connection reset");
    }

    pub fn make_key(&self, code: &str) -> String {
        format!("{}{}", self.key_prefix, code)
    }

    /// Run one command with a connection, bounded by `op_timeout`.
    async fn run<T, F, Fut>(&self, what: &str, op: F) -> Option<T>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: Future<Output = redis::RedisResult<T>>,
    {
        let attempt = async {
            let conn = self.get_connection().await?;
            op(conn).await
        };

        match timeout(self.op_timeout, attempt).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                error!("Redis {} failed: {}", what, e);
                self.reset_connection().await;
                None
            }
            Err(_) => {
                warn!("Redis {} timed out after {:?}", what, self.op_timeout);
                self.reset_connection().await;
                None
            }
        }
    }
}

/// Decode a stored payload; anything that is not a full alias record is a miss.
pub fn decode_entry(code: &str, data: &str) -> CacheLookup {
    match serde_json::from_str::<AliasRecord>(data) {
        Ok(record) => {
            trace!("Cache hit: {}", code);
            CacheLookup::Hit(record)
        }
        Err(e) => {
            warn!("Undecodable cache entry for '{}': {}", code, e);
            CacheLookup::Miss
        }
    }
}

#[async_trait]
impl AliasCache for RedisAliasCache {
    async fn get(&self, code: &str) -> CacheLookup {
        let key = self.make_key(code);
        let fetched = self
            .run("GET", |mut conn| async move {
                let value: Option<String> = conn.get(key).await?;
                Ok(value)
            })
            .await;

        match fetched {
            Some(Some(data)) => decode_entry(code, &data),
            Some(None) | None => CacheLookup::Miss,
        }
    }

    async fn insert(&self, record: &AliasRecord) {
        let payload = match serde_json::to_string(record) {
            Ok(p) => p,
            Err(e) => {
                error!("Failed to serialize alias '{}': {}", record.code, e);
                return;
            }
        };

        let key = self.make_key(&record.code);
        let ttl = self.ttl;
        if self
            .run("SETEX", |mut conn| async move {
                conn.set_ex::<String, String, ()>(key, payload, ttl).await
            })
            .await
            .is_some()
        {
            trace!("Cached alias '{}'", record.code);
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn unreachable_cache() -> RedisAliasCache {
        // Port 1 is never a Redis server; connects fail fast.
        let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
        RedisAliasCache::with_client(client, "url:".to_string(), 60, Duration::from_millis(300))
    }

    #[test]
    fn test_make_key_uses_prefix() {
        let cache = unreachable_cache();
        assert_eq!(cache.make_key("abc123"), "url:abc123");
    }

    #[test]
    fn test_decode_entry() {
        let record = AliasRecord {
            code: "abc123".to_string(),
            target: "https://example.com".to_string(),
            custom_alias: None,
            created_at: Utc::now(),
            expires_at: None,
        };
        let payload = serde_json::to_string(&record).unwrap();
        assert_eq!(decode_entry("abc123", &payload), CacheLookup::Hit(record));

        assert_eq!(decode_entry("abc123", "not json at all"), CacheLookup::Miss);
        assert_eq!(decode_entry("abc123", ""), CacheLookup::Miss);
        // Truncated mid-record
        assert_eq!(
            decode_entry("abc123", &payload[..payload.len() / 2]),
            CacheLookup::Miss
        );
        // Valid JSON, wrong shape
        assert_eq!(
            decode_entry("abc123", r#"{"code":"abc123"}"#),
            CacheLookup::Miss
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_miss() {
        let cache = unreachable_cache();
        let record = AliasRecord {
            code: "abc123".to_string(),
            target: "https://example.com".to_string(),
            custom_alias: None,
            created_at: Utc::now(),
            expires_at: None,
        };

        cache.insert(&record).await;
        assert_eq!(cache.get("abc123").await, CacheLookup::Miss);
    }
}
