//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_user;
mod m20240101_000002_create_user_credentials;
mod m20240101_000003_create_patient;
mod m20240101_000004_create_technique;
mod m20240101_000005_create_service;
mod m20240101_000006_create_package;
mod m20240101_000007_create_appointment;
mod m20240101_000008_create_sale;
mod m20240101_000009_create_patient_service_balance;
mod m20240101_000010_create_user_technique;
mod m20240101_000099_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user::Migration),
            Box::new(m20240101_000002_create_user_credentials::Migration),
            Box::new(m20240101_000003_create_patient::Migration),
            Box::new(m20240101_000004_create_technique::Migration),
            Box::new(m20240101_000005_create_service::Migration),
            Box::new(m20240101_000006_create_package::Migration),
            Box::new(m20240101_000007_create_appointment::Migration),
            Box::new(m20240101_000008_create_sale::Migration),
            Box::new(m20240101_000009_create_patient_service_balance::Migration),
            Box::new(m20240101_000010_create_user_technique::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000099_add_indexes::Migration),
        ]
    }
}
