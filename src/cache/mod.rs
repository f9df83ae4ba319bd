//! Alias cache
//!
//! The cache is advisory. Lookups that fail for any reason come back as a
//! miss and the resolver falls through to the alias store.

pub mod moka;
pub mod null;
pub mod redis;
pub mod traits;

use std::sync::Arc;

use tracing::{info, warn};

pub use self::moka::MokaAliasCache;
pub use self::null::NullAliasCache;
pub use self::redis::{RedisAliasCache, decode_entry};
pub use traits::{AliasCache, CacheLookup};

use crate::config::CacheConfig;
use crate::errors::{LinkmeterError, Result};

/// Build the cache selected by `cache.type`.
///
/// An unreachable Redis at startup degrades to no cache instead of
/// refusing to start.
pub async fn create_cache(config: &CacheConfig) -> Result<Arc<dyn AliasCache>> {
    let cache: Arc<dyn AliasCache> = match config.cache_type.as_str() {
        "redis" => match RedisAliasCache::connect(config).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                warn!("{}; continuing without a cache", e);
                Arc::new(NullAliasCache)
            }
        },
        "memory" => Arc::new(MokaAliasCache::new(config)),
        "none" => Arc::new(NullAliasCache),
        other => {
            return Err(LinkmeterError::config(format!(
                "Unknown cache type '{}'. Valid: redis, memory, none",
                other
            )));
        }
    };

    info!("Alias cache: {}", cache.name());
    Ok(cache)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_cache_by_type() {
        let mut config = CacheConfig::default();

        config.cache_type = "memory".to_string();
        assert_eq!(create_cache(&config).await.unwrap().name(), "memory");

        config.cache_type = "none".to_string();
        assert_eq!(create_cache(&config).await.unwrap().name(), "none");

        config.cache_type = "memcached".to_string();
        assert!(matches!(
            create_cache(&config).await,
            Err(LinkmeterError::Config(_))
        ));
    }
}
