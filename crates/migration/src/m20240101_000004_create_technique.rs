//! Create `technique` table: therapy techniques services are built from.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Technique::Table)
                    .if_not_exists()
                    .col(uuid(Technique::Id).primary_key())
                    .col(string_len(Technique::Name, 128).unique_key().not_null())
                    .col(ColumnDef::new(Technique::Description).text().null())
                    .col(timestamp_with_time_zone(Technique::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Technique::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Technique { Table, Id, Name, Description, CreatedAt }
