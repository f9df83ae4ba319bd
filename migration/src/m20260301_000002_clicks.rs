//! Click log table
//!
//! One row per resolved redirect. The `code` column is not a
//! foreign key: clicks outlive the liveness of their alias.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Clicks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clicks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clicks::Code).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Clicks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Clicks::Ip).string_len(45).null())
                    .col(ColumnDef::new(Clicks::Browser).string_len(100).null())
                    .col(ColumnDef::new(Clicks::Os).string_len(100).null())
                    .col(ColumnDef::new(Clicks::Device).string_len(20).null())
                    .col(ColumnDef::new(Clicks::RawUserAgent).text().null())
                    .col(ColumnDef::new(Clicks::Referer).text().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_code")
                    .table(Clicks::Table)
                    .col(Clicks::Code)
                    .to_owned(),
            )
            .await?;

        // Windowed aggregations filter on (code, created_at)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_code_time")
                    .table(Clicks::Table)
                    .col(Clicks::Code)
                    .col(Clicks::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_clicks_code_time").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_clicks_code").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Clicks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Clicks {
    #[sea_orm(iden = "clicks")]
    Table,
    Id,
    Code,
    CreatedAt,
    Ip,
    Browser,
    Os,
    Device,
    RawUserAgent,
    Referer,
}
