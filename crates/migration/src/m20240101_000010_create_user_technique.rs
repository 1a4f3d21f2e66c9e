//! Create `user_technique`: which therapist practices which technique.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserTechnique::Table)
                    .if_not_exists()
                    .col(uuid(UserTechnique::UserId).not_null())
                    .col(uuid(UserTechnique::TechniqueId).not_null())
                    .col(string_len(UserTechnique::Status, 16).not_null())
                    .col(timestamp_with_time_zone(UserTechnique::CreatedAt).not_null())
                    .primary_key(
                        Index::create()
                            .col(UserTechnique::UserId)
                            .col(UserTechnique::TechniqueId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_technique_user")
                            .from(UserTechnique::Table, UserTechnique::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_technique_technique")
                            .from(UserTechnique::Table, UserTechnique::TechniqueId)
                            .to(Technique::Table, Technique::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserTechnique::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum UserTechnique { Table, UserId, TechniqueId, Status, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Technique { Table, Id }
