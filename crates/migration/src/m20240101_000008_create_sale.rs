//! Create `sale`: a purchase of service sessions or of a package.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sale::Table)
                    .if_not_exists()
                    .col(uuid(Sale::Id).primary_key())
                    .col(uuid(Sale::PatientId).not_null())
                    .col(string_len(Sale::SaleType, 16).not_null())
                    .col(ColumnDef::new(Sale::ServiceId).uuid().null())
                    .col(ColumnDef::new(Sale::PackageId).uuid().null())
                    .col(ColumnDef::new(Sale::Sessions).integer().null())
                    .col(double(Sale::Amount).not_null())
                    .col(timestamp_with_time_zone(Sale::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_patient")
                            .from(Sale::Table, Sale::PatientId)
                            .to(Patient::Table, Patient::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_service")
                            .from(Sale::Table, Sale::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_package")
                            .from(Sale::Table, Sale::PackageId)
                            .to(Package::Table, Package::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Sale::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Sale { Table, Id, PatientId, SaleType, ServiceId, PackageId, Sessions, Amount, CreatedAt }

#[derive(DeriveIden)]
enum Patient { Table, Id }

#[derive(DeriveIden)]
enum Service { Table, Id }

#[derive(DeriveIden)]
enum Package { Table, Id }
