use crate::storage::AliasRecord;
use migration::entities::alias;

pub fn model_to_alias(model: alias::Model) -> AliasRecord {
    AliasRecord {
        code: model.code,
        target: model.target_url,
        custom_alias: model.custom_alias,
        created_at: model.created_at,
        expires_at: model.expires_at,
    }
}

/// Build an insert model; aliases are never updated so every field is `Set`.
pub fn alias_to_active_model(record: &AliasRecord) -> alias::ActiveModel {
    use sea_orm::ActiveValue::Set;

    alias::ActiveModel {
        code: Set(record.code.clone()),
        target_url: Set(record.target.clone()),
        custom_alias: Set(record.custom_alias.clone()),
        created_at: Set(record.created_at),
        expires_at: Set(record.expires_at),
    }
}
