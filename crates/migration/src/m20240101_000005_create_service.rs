//! Create `service` and its `service_technique` link table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(uuid(Service::Id).primary_key())
                    .col(string_len(Service::Name, 128).not_null())
                    .col(text(Service::Description).not_null())
                    .col(double(Service::Price).not_null())
                    .col(integer(Service::Duration).not_null())
                    .col(string_len(Service::Status, 16).not_null())
                    .col(timestamp_with_time_zone(Service::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Service::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ServiceTechnique::Table)
                    .if_not_exists()
                    .col(uuid(ServiceTechnique::ServiceId).not_null())
                    .col(uuid(ServiceTechnique::TechniqueId).not_null())
                    .primary_key(
                        Index::create()
                            .col(ServiceTechnique::ServiceId)
                            .col(ServiceTechnique::TechniqueId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_technique_service")
                            .from(ServiceTechnique::Table, ServiceTechnique::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_technique_technique")
                            .from(ServiceTechnique::Table, ServiceTechnique::TechniqueId)
                            .to(Technique::Table, Technique::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceTechnique::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service { Table, Id, Name, Description, Price, Duration, Status, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum ServiceTechnique { Table, ServiceId, TechniqueId }

#[derive(DeriveIden)]
enum Technique { Table, Id }
