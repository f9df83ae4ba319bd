use async_trait::async_trait;

use super::{AliasCache, CacheLookup};
use crate::storage::AliasRecord;

/// Cache that never holds anything. Used when caching is disabled.
pub struct NullAliasCache;

#[async_trait]
impl AliasCache for NullAliasCache {
    async fn get(&self, _code: &str) -> CacheLookup {
        CacheLookup::Miss
    }

    async fn insert(&self, _record: &AliasRecord) {}

    fn name(&self) -> &'static str {
        "none"
    }
}
