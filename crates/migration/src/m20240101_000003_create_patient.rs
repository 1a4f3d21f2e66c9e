//! Create `patient` table.
//!
//! Contact and demographic fields other than the name are optional.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Patient::Table)
                    .if_not_exists()
                    .col(uuid(Patient::Id).primary_key())
                    .col(string_len(Patient::FirstName, 128).not_null())
                    .col(string_len(Patient::LastName, 128).not_null())
                    .col(ColumnDef::new(Patient::DateOfBirth).date().null())
                    .col(ColumnDef::new(Patient::Gender).string_len(32).null())
                    .col(ColumnDef::new(Patient::Phone).string_len(64).null())
                    .col(ColumnDef::new(Patient::Email).string_len(255).null())
                    .col(ColumnDef::new(Patient::Address).string_len(512).null())
                    .col(ColumnDef::new(Patient::Notes).text().null())
                    .col(timestamp_with_time_zone(Patient::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Patient::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Patient::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Patient {
    Table,
    Id,
    FirstName,
    LastName,
    DateOfBirth,
    Gender,
    Phone,
    Email,
    Address,
    Notes,
    CreatedAt,
    UpdatedAt,
}
