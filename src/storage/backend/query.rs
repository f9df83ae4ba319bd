//! Alias lookups

use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::error;

use super::converters::model_to_alias;
use super::{SeaOrmStorage, retry};
use crate::errors::{LinkmeterError, Result};
use crate::storage::AliasRecord;

use migration::entities::alias;

impl SeaOrmStorage {
    /// Point lookup by code, live or not.
    ///
    /// Matches either the primary code or a caller-picked custom alias.
    pub async fn get_alias(&self, code: &str) -> Result<Option<AliasRecord>> {
        let db = &self.db;
        let code_owned = code.to_string();

        let result = retry::with_retry(&format!("get_alias({})", code), self.retry_config, || async {
            alias::Entity::find()
                .filter(
                    Condition::any()
                        .add(alias::Column::Code.eq(code_owned.as_str()))
                        .add(alias::Column::CustomAlias.eq(code_owned.as_str())),
                )
                .one(db)
                .await
        })
        .await;

        match result {
            Ok(model) => Ok(model.map(model_to_alias)),
            Err(e) => {
                error!("Alias lookup failed after retries: {}", e);
                Err(LinkmeterError::database_operation(format!(
                    "Alias lookup failed: {}",
                    e
                )))
            }
        }
    }

    pub async fn alias_exists(&self, code: &str) -> Result<bool> {
        let count = alias::Entity::find()
            .filter(
                Condition::any()
                    .add(alias::Column::Code.eq(code))
                    .add(alias::Column::CustomAlias.eq(code)),
            )
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }
}
