//! Create `appointment` and the `appointment_patient` link table.
//!
//! `evaluation` stays NULL until the appointment is completed.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appointment::Table)
                    .if_not_exists()
                    .col(uuid(Appointment::Id).primary_key())
                    .col(uuid(Appointment::ServiceId).not_null())
                    .col(ColumnDef::new(Appointment::TherapistId).uuid().null())
                    .col(timestamp_with_time_zone(Appointment::Date).not_null())
                    .col(ColumnDef::new(Appointment::Description).text().null())
                    .col(string_len(Appointment::Mode, 16).not_null())
                    .col(string_len(Appointment::Status, 16).not_null())
                    .col(ColumnDef::new(Appointment::Evaluation).string_len(32).null())
                    .col(timestamp_with_time_zone(Appointment::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Appointment::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_service")
                            .from(Appointment::Table, Appointment::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_therapist")
                            .from(Appointment::Table, Appointment::TherapistId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AppointmentPatient::Table)
                    .if_not_exists()
                    .col(uuid(AppointmentPatient::AppointmentId).not_null())
                    .col(uuid(AppointmentPatient::PatientId).not_null())
                    .primary_key(
                        Index::create()
                            .col(AppointmentPatient::AppointmentId)
                            .col(AppointmentPatient::PatientId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_patient_appointment")
                            .from(AppointmentPatient::Table, AppointmentPatient::AppointmentId)
                            .to(Appointment::Table, Appointment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_patient_patient")
                            .from(AppointmentPatient::Table, AppointmentPatient::PatientId)
                            .to(Patient::Table, Patient::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AppointmentPatient::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Appointment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Appointment {
    Table,
    Id,
    ServiceId,
    TherapistId,
    Date,
    Description,
    Mode,
    Status,
    Evaluation,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AppointmentPatient { Table, AppointmentId, PatientId }

#[derive(DeriveIden)]
enum Service { Table, Id }

#[derive(DeriveIden)]
enum Patient { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
