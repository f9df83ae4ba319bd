use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Aliases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Aliases::Code)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Aliases::TargetUrl).text().not_null())
                    .col(ColumnDef::new(Aliases::CustomAlias).string_len(64).null())
                    .col(
                        ColumnDef::new(Aliases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Aliases::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // NULLs do not collide, so only caller-picked codes are constrained here
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_aliases_custom_alias")
                    .table(Aliases::Table)
                    .col(Aliases::CustomAlias)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_aliases_custom_alias").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Aliases::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Aliases {
    #[sea_orm(iden = "aliases")]
    Table,
    Code,
    TargetUrl,
    CustomAlias,
    CreatedAt,
    ExpiresAt,
}
