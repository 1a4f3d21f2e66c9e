#![cfg(test)]
//! Fixtures for action tests: a migrated in-memory database and row builders
//! that skip the action-level validation.

use chrono::{TimeZone, Utc};
use migration::MigratorTrait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use uuid::Uuid;

use models::enums::{AppointmentMode, AppointmentStatus, CatalogStatus, SaleType, UserRole};
use models::{appointment, appointment_patient, package, package_item, patient, patient_service_balance, sale, service, technique, user};

/// Fresh, fully migrated SQLite database private to the calling test.
///
/// The pool is pinned to one connection: every `sqlite::memory:` connection
/// opens its own empty database.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// 2024-01-`day` 10:00 UTC.
pub fn at(day: u32) -> DateTimeWithTimeZone {
    Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap().fixed_offset()
}

pub async fn user_with_role(db: &DatabaseConnection, name: &str, role: UserRole) -> Result<user::Model, anyhow::Error> {
    let email = format!("{}.{}@clinic.test", name.to_lowercase().replace(' ', "."), &Uuid::new_v4().simple().to_string()[..8]);
    Ok(user::create(db, &email, name, role).await?)
}

pub async fn therapist(db: &DatabaseConnection, name: &str) -> Result<user::Model, anyhow::Error> {
    user_with_role(db, name, UserRole::Therapist).await
}

pub async fn patient(db: &DatabaseConnection, first_name: &str) -> Result<patient::Model, anyhow::Error> {
    let now = Utc::now().into();
    let am = patient::ActiveModel {
        id: Set(Uuid::new_v4()),
        first_name: Set(first_name.to_string()),
        last_name: Set("Tester".into()),
        date_of_birth: Set(None),
        gender: Set(None),
        phone: Set(None),
        email: Set(None),
        address: Set(None),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn technique(db: &DatabaseConnection, name: &str) -> Result<technique::Model, anyhow::Error> {
    Ok(technique::create(db, name, None).await?)
}

async fn insert_service(db: &DatabaseConnection, name: &str, status: CatalogStatus) -> Result<service::Model, anyhow::Error> {
    let now = Utc::now().into();
    let am = service::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(format!("{name} session of the practice")),
        price: Set(40.0),
        duration: Set(60),
        status: Set(status.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

/// ACTIVE service without technique links.
pub async fn service(db: &DatabaseConnection, name: &str) -> Result<service::Model, anyhow::Error> {
    insert_service(db, name, CatalogStatus::Active).await
}

pub async fn inactive_service(db: &DatabaseConnection, name: &str) -> Result<service::Model, anyhow::Error> {
    insert_service(db, name, CatalogStatus::Inactive).await
}

pub async fn package(db: &DatabaseConnection, name: &str, items: &[(Uuid, i32)], status: CatalogStatus) -> Result<package::Model, anyhow::Error> {
    let now = Utc::now().into();
    let created = package::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        price: Set(120.0),
        status: Set(status.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    for (service_id, sessions) in items {
        package_item::ActiveModel {
            package_id: Set(created.id),
            service_id: Set(*service_id),
            sessions: Set(*sessions),
        }
        .insert(db)
        .await?;
    }
    Ok(created)
}

pub async fn balance(
    db: &DatabaseConnection,
    patient_id: Uuid,
    service_id: Uuid,
    total: i32,
    used: i32,
    created_at: DateTimeWithTimeZone,
) -> Result<patient_service_balance::Model, anyhow::Error> {
    let am = patient_service_balance::ActiveModel {
        id: Set(Uuid::new_v4()),
        patient_id: Set(patient_id),
        service_id: Set(service_id),
        sale_id: Set(None),
        total: Set(total),
        used: Set(used),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    };
    Ok(am.insert(db).await?)
}

/// PROGRAMMED appointment dated 2024-01-15 linked to `patient_ids`.
pub async fn programmed_appointment(db: &DatabaseConnection, service_id: Uuid, patient_ids: &[Uuid]) -> Result<appointment::Model, anyhow::Error> {
    let now = Utc::now().into();
    let mode = if patient_ids.len() == 1 { AppointmentMode::Single } else { AppointmentMode::Multiple };
    let created = appointment::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_id: Set(service_id),
        therapist_id: Set(None),
        date: Set(at(15)),
        description: Set(None),
        mode: Set(mode.as_str().to_string()),
        status: Set(AppointmentStatus::Programmed.as_str().to_string()),
        evaluation: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    for pid in patient_ids {
        appointment_patient::ActiveModel { appointment_id: Set(created.id), patient_id: Set(*pid) }
            .insert(db)
            .await?;
    }
    Ok(created)
}

/// SERVICE sale row without a balance, for aggregation tests.
pub async fn sale_at(
    db: &DatabaseConnection,
    patient_id: Uuid,
    service_id: Uuid,
    amount: f64,
    created_at: DateTimeWithTimeZone,
) -> Result<sale::Model, anyhow::Error> {
    let am = sale::ActiveModel {
        id: Set(Uuid::new_v4()),
        patient_id: Set(patient_id),
        sale_type: Set(SaleType::Service.as_str().to_string()),
        service_id: Set(Some(service_id)),
        package_id: Set(None),
        sessions: Set(Some(1)),
        amount: Set(amount),
        created_at: Set(created_at),
    };
    Ok(am.insert(db).await?)
}
