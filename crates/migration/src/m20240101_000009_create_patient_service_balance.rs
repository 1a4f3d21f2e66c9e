//! Create `patient_service_balance` (prepaid session credits) and
//! `balance_usage`, the log of sessions consumed from a balance.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PatientServiceBalance::Table)
                    .if_not_exists()
                    .col(uuid(PatientServiceBalance::Id).primary_key())
                    .col(uuid(PatientServiceBalance::PatientId).not_null())
                    .col(uuid(PatientServiceBalance::ServiceId).not_null())
                    .col(ColumnDef::new(PatientServiceBalance::SaleId).uuid().null())
                    .col(integer(PatientServiceBalance::Total).not_null())
                    .col(integer(PatientServiceBalance::Used).not_null())
                    .col(timestamp_with_time_zone(PatientServiceBalance::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(PatientServiceBalance::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_balance_patient")
                            .from(PatientServiceBalance::Table, PatientServiceBalance::PatientId)
                            .to(Patient::Table, Patient::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_balance_service")
                            .from(PatientServiceBalance::Table, PatientServiceBalance::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_balance_sale")
                            .from(PatientServiceBalance::Table, PatientServiceBalance::SaleId)
                            .to(Sale::Table, Sale::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BalanceUsage::Table)
                    .if_not_exists()
                    .col(uuid(BalanceUsage::Id).primary_key())
                    .col(uuid(BalanceUsage::BalanceId).not_null())
                    .col(uuid(BalanceUsage::AppointmentId).not_null())
                    .col(uuid(BalanceUsage::PatientId).not_null())
                    .col(timestamp_with_time_zone(BalanceUsage::UsedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_balance_usage_balance")
                            .from(BalanceUsage::Table, BalanceUsage::BalanceId)
                            .to(PatientServiceBalance::Table, PatientServiceBalance::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_balance_usage_appointment")
                            .from(BalanceUsage::Table, BalanceUsage::AppointmentId)
                            .to(Appointment::Table, Appointment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(BalanceUsage::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(PatientServiceBalance::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum PatientServiceBalance { Table, Id, PatientId, ServiceId, SaleId, Total, Used, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum BalanceUsage { Table, Id, BalanceId, AppointmentId, PatientId, UsedAt }

#[derive(DeriveIden)]
enum Patient { Table, Id }

#[derive(DeriveIden)]
enum Service { Table, Id }

#[derive(DeriveIden)]
enum Sale { Table, Id }

#[derive(DeriveIden)]
enum Appointment { Table, Id }
