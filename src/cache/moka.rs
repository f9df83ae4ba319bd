use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, trace};

use super::{AliasCache, CacheLookup};
use crate::config::CacheConfig;
use crate::storage::AliasRecord;

/// In-process cache for single-instance deployments.
///
/// Entries live for `default_ttl` regardless of the alias expiry; the
/// resolver checks liveness on every hit.
pub struct MokaAliasCache {
    inner: Cache<String, AliasRecord>,
}

impl MokaAliasCache {
    pub fn new(config: &CacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.memory.max_capacity)
            .time_to_live(Duration::from_secs(config.default_ttl))
            .build();

        debug!(
            "MokaAliasCache initialized: capacity {}, ttl {}s",
            config.memory.max_capacity, config.default_ttl
        );
        Self { inner }
    }
}

#[async_trait]
impl AliasCache for MokaAliasCache {
    async fn get(&self, code: &str) -> CacheLookup {
        match self.inner.get(code).await {
            Some(record) => {
                trace!("Memory cache hit: {}", code);
                CacheLookup::Hit(record)
            }
            None => CacheLookup::Miss,
        }
    }

    async fn insert(&self, record: &AliasRecord) {
        self.inner
            .insert(record.code.clone(), record.clone())
            .await;
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    #[tokio::test]
    async fn test_keeps_expired_records_for_the_resolver_to_judge() {
        let cache = MokaAliasCache::new(&CacheConfig::default());
        let record = AliasRecord {
            code: "old1".to_string(),
            target: "https://example.com".to_string(),
            custom_alias: None,
            created_at: Utc::now() - ChronoDuration::days(2),
            expires_at: Some(Utc::now() - ChronoDuration::days(1)),
        };

        assert_eq!(cache.get("old1").await, CacheLookup::Miss);
        cache.insert(&record).await;
        assert_eq!(cache.get("old1").await, CacheLookup::Hit(record));
    }
}
