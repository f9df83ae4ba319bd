use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::{
    AnalyticsField, FieldCountRow, PeriodCounts, SeaOrmStorage, TimeWindow, UserAgentCountRow,
};
pub use models::AliasRecord;

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<SeaOrmStorage>> {
        let backend_type = backend::infer_backend_from_url(&config.database_url)?;
        let storage = SeaOrmStorage::new(&config.database_url, &backend_type, config).await?;
        Ok(Arc::new(storage))
    }
}
