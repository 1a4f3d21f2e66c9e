use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Balance lookup on completion: (patient, service) then FIFO by created_at
        manager
            .create_index(
                Index::create()
                    .name("idx_balance_patient_service")
                    .table(PatientServiceBalance::Table)
                    .col(PatientServiceBalance::PatientId)
                    .col(PatientServiceBalance::ServiceId)
                    .col(PatientServiceBalance::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appointment_date")
                    .table(Appointment::Table)
                    .col(Appointment::Date)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_appointment_service")
                    .table(Appointment::Table)
                    .col(Appointment::ServiceId)
                    .to_owned(),
            )
            .await?;

        // Chart aggregation scans sales by date
        manager
            .create_index(
                Index::create()
                    .name("idx_sale_created_at")
                    .table(Sale::Table)
                    .col(Sale::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_sale_patient")
                    .table(Sale::Table)
                    .col(Sale::PatientId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_balance_patient_service").table(PatientServiceBalance::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_appointment_date").table(Appointment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_appointment_service").table(Appointment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_sale_created_at").table(Sale::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_sale_patient").table(Sale::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PatientServiceBalance { Table, PatientId, ServiceId, CreatedAt }

#[derive(DeriveIden)]
enum Appointment { Table, Date, ServiceId }

#[derive(DeriveIden)]
enum Sale { Table, CreatedAt, PatientId }
