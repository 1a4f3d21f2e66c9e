//! Create `package` and `package_item`.
//!
//! A package bundles services at a fixed price; each item carries the
//! number of sessions of that service granted when the package is sold.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Package::Table)
                    .if_not_exists()
                    .col(uuid(Package::Id).primary_key())
                    .col(string_len(Package::Name, 128).not_null())
                    .col(ColumnDef::new(Package::Description).text().null())
                    .col(double(Package::Price).not_null())
                    .col(string_len(Package::Status, 16).not_null())
                    .col(timestamp_with_time_zone(Package::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Package::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PackageItem::Table)
                    .if_not_exists()
                    .col(uuid(PackageItem::PackageId).not_null())
                    .col(uuid(PackageItem::ServiceId).not_null())
                    .col(integer(PackageItem::Sessions).not_null())
                    .primary_key(
                        Index::create()
                            .col(PackageItem::PackageId)
                            .col(PackageItem::ServiceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_package_item_package")
                            .from(PackageItem::Table, PackageItem::PackageId)
                            .to(Package::Table, Package::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_package_item_service")
                            .from(PackageItem::Table, PackageItem::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PackageItem::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Package::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Package { Table, Id, Name, Description, Price, Status, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum PackageItem { Table, PackageId, ServiceId, Sessions }

#[derive(DeriveIden)]
enum Service { Table, Id }
