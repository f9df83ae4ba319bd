use async_trait::async_trait;

use crate::storage::AliasRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(AliasRecord),
    /// Absent, undecodable, or the cache could not be reached
    Miss,
}

#[async_trait]
pub trait AliasCache: Send + Sync {
    async fn get(&self, code: &str) -> CacheLookup;

    /// Best-effort write; failures are logged by the implementation.
    async fn insert(&self, record: &AliasRecord);

    fn name(&self) -> &'static str;
}
