//! ClickSink implementation for SeaOrmStorage

use async_trait::async_trait;
use sea_orm::{ActiveValue::Set, EntityTrait};
use tracing::trace;

use super::SeaOrmStorage;
use crate::analytics::{ClickRecord, ClickSink};

use migration::entities::click;

#[async_trait]
impl ClickSink for SeaOrmStorage {
    async fn insert_click(&self, record: ClickRecord) -> anyhow::Result<()> {
        let code = record.code.clone();
        let model = click::ActiveModel {
            code: Set(record.code),
            created_at: Set(record.created_at),
            ip: Set(record.ip),
            browser: Set(record.browser),
            os: Set(record.os),
            device: Set(record.device),
            raw_user_agent: Set(record.raw_user_agent),
            referer: Set(record.referer),
            ..Default::default()
        };

        click::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to insert click for '{}': {}", code, e))?;

        trace!("Click row appended for '{}'", code);
        Ok(())
    }
}
