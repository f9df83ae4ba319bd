//! Alias inserts

use sea_orm::{DbErr, EntityTrait, SqlErr};
use tracing::{error, info};

use super::SeaOrmStorage;
use super::converters::alias_to_active_model;
use crate::errors::{LinkmeterError, Result};
use crate::storage::AliasRecord;

use migration::entities::alias;

impl SeaOrmStorage {
    /// Insert a new alias.
    ///
    /// A duplicate code or custom alias yields `Conflict`. Not retried.
    pub async fn insert_alias(&self, record: &AliasRecord) -> Result<()> {
        let model = alias_to_active_model(record);

        match alias::Entity::insert(model).exec(&self.db).await {
            Ok(_) => {
                info!("Alias inserted: {} -> {}", record.code, record.target);
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => Err(LinkmeterError::conflict(format!(
                "Short code '{}' already exists",
                record.code
            ))),
            Err(e) => {
                error!("Failed to insert alias '{}': {}", record.code, e);
                Err(LinkmeterError::database_operation(format!(
                    "Failed to insert alias: {}",
                    e
                )))
            }
        }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
