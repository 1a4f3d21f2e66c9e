//! Appointment booking, completion and evaluation.
//!
//! Completing an appointment consumes one prepaid session: the oldest
//! balance of the patient for the appointment's service that still has
//! `used < total` (created_at, then id, ascending). The balance increment,
//! the usage row and the status change commit together or not at all.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::enums::{AppointmentMode, AppointmentStatus, Evaluation};
use models::{appointment, appointment_patient, balance_usage, patient, patient_service_balance};

use crate::catalog_service::require_active_service;
use crate::errors::ActionError;
use crate::user_service::require_therapist;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateAppointmentInput {
    pub service_id: Uuid,
    pub patient_ids: Vec<Uuid>,
    pub date: DateTimeWithTimeZone,
    pub mode: AppointmentMode,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub therapist_id: Option<Uuid>,
}

impl CreateAppointmentInput {
    pub fn validate(&self) -> Result<(), ActionError> {
        if self.patient_ids.is_empty() {
            return Err(ActionError::Validation("patient_ids must contain at least one patient".into()));
        }
        if crate::dedup_ids(self.patient_ids.clone()).len() != self.patient_ids.len() {
            return Err(ActionError::Validation("patient_ids must not contain duplicates".into()));
        }
        if self.mode == AppointmentMode::Single && self.patient_ids.len() != 1 {
            return Err(ActionError::Validation("SINGLE appointments take exactly one patient".into()));
        }
        Ok(())
    }
}

/// Fields that may change while an appointment is still PROGRAMMED.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentInput {
    #[serde(default)]
    pub date: Option<DateTimeWithTimeZone>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub therapist_id: Option<Uuid>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppointmentFilter {
    pub from: Option<DateTimeWithTimeZone>,
    pub to: Option<DateTimeWithTimeZone>,
    pub patient_id: Option<Uuid>,
    pub therapist_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: appointment::Model,
    pub patient_ids: Vec<Uuid>,
}

/// What a completion consumed.
#[derive(Clone, Debug, Serialize)]
pub struct Completion {
    pub appointment: appointment::Model,
    pub balance: patient_service_balance::Model,
    pub usage: balance_usage::Model,
}

/// Book an appointment for one or more patients.
#[instrument(skip(db, input), fields(service_id = %input.service_id, patients = input.patient_ids.len()))]
pub async fn create_appointment(db: &DatabaseConnection, input: CreateAppointmentInput) -> Result<AppointmentDetail, ActionError> {
    input.validate()?;

    let txn = db.begin().await?;
    require_active_service(&txn, input.service_id).await?;
    let found = patient::Entity::find()
        .filter(patient::Column::Id.is_in(input.patient_ids.iter().copied()))
        .count(&txn)
        .await?;
    if found != input.patient_ids.len() as u64 {
        return Err(ActionError::not_found("patient"));
    }
    if let Some(tid) = input.therapist_id {
        require_therapist(&txn, tid).await?;
    }

    let now = Utc::now().into();
    let created = appointment::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_id: Set(input.service_id),
        therapist_id: Set(input.therapist_id),
        date: Set(input.date),
        description: Set(non_blank(input.description)),
        mode: Set(input.mode.as_str().to_string()),
        status: Set(AppointmentStatus::Programmed.as_str().to_string()),
        evaluation: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let links = input.patient_ids.iter().map(|pid| appointment_patient::ActiveModel {
        appointment_id: Set(created.id),
        patient_id: Set(*pid),
    });
    appointment_patient::Entity::insert_many(links).exec_without_returning(&txn).await?;
    txn.commit().await?;

    info!(appointment_id = %created.id, mode = %input.mode, "appointment_created");
    Ok(AppointmentDetail { appointment: created, patient_ids: input.patient_ids })
}

/// Mark an appointment DONE for `patient_id`, consuming one prepaid session.
#[instrument(skip(db), fields(appointment_id = %appointment_id, patient_id = %patient_id))]
pub async fn complete_appointment(db: &DatabaseConnection, appointment_id: Uuid, patient_id: Uuid) -> Result<Completion, ActionError> {
    use patient_service_balance::Column as B;

    let txn = db.begin().await?;
    let found = appointment::Entity::find_by_id(appointment_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ActionError::not_found("appointment"))?;
    if found.is_done() {
        return Err(ActionError::rule("appointment already completed"));
    }
    appointment_patient::Entity::find_by_id((appointment_id, patient_id))
        .one(&txn)
        .await?
        .ok_or_else(|| ActionError::rule("patient is not booked on this appointment"))?;

    let candidate = patient_service_balance::Entity::find()
        .filter(B::PatientId.eq(patient_id))
        .filter(B::ServiceId.eq(found.service_id))
        .filter(Expr::col(B::Used).lt(Expr::col(B::Total)))
        .order_by_asc(B::CreatedAt)
        .order_by_asc(B::Id)
        .one(&txn)
        .await?;
    let Some(candidate) = candidate else {
        warn!(service_id = %found.service_id, "no_available_balance");
        return Err(ActionError::rule("no available balance for this patient and service"));
    };

    let now: DateTimeWithTimeZone = Utc::now().into();
    // Guarded increment: never lets `used` pass `total`.
    let res = patient_service_balance::Entity::update_many()
        .col_expr(B::Used, Expr::col(B::Used).add(1))
        .col_expr(B::UpdatedAt, Expr::value(now))
        .filter(B::Id.eq(candidate.id))
        .filter(Expr::col(B::Used).lt(Expr::col(B::Total)))
        .exec(&txn)
        .await?;
    if res.rows_affected != 1 {
        return Err(ActionError::rule("no available balance for this patient and service"));
    }
    let balance = patient_service_balance::Entity::find_by_id(candidate.id)
        .one(&txn)
        .await?
        .ok_or_else(|| ActionError::not_found("balance"))?;

    let usage = balance_usage::ActiveModel {
        id: Set(Uuid::new_v4()),
        balance_id: Set(balance.id),
        appointment_id: Set(appointment_id),
        patient_id: Set(patient_id),
        used_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let mut am: appointment::ActiveModel = found.into();
    am.status = Set(AppointmentStatus::Done.as_str().to_string());
    am.evaluation = Set(Some(Evaluation::UnderEvaluation.as_str().to_string()));
    am.updated_at = Set(now);
    let appointment = am.update(&txn).await?;
    txn.commit().await?;

    info!(balance_id = %balance.id, remaining = balance.remaining(), "appointment_completed");
    Ok(Completion { appointment, balance, usage })
}

/// Record the review outcome of a completed appointment.
#[instrument(skip(db), fields(appointment_id = %id, evaluation = %evaluation))]
pub async fn evaluate_appointment(db: &DatabaseConnection, id: Uuid, evaluation: Evaluation) -> Result<appointment::Model, ActionError> {
    if evaluation == Evaluation::UnderEvaluation {
        return Err(ActionError::Validation("evaluation must be APPROVED or REJECTED".into()));
    }
    let found = appointment::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ActionError::not_found("appointment"))?;
    if !found.is_done() {
        return Err(ActionError::rule("only completed appointments can be evaluated"));
    }
    let mut am: appointment::ActiveModel = found.into();
    am.evaluation = Set(Some(evaluation.as_str().to_string()));
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(appointment_id = %id, "appointment_evaluated");
    Ok(updated)
}

/// Reschedule or reassign a PROGRAMMED appointment.
#[instrument(skip(db, input), fields(appointment_id = %id))]
pub async fn update_appointment(db: &DatabaseConnection, id: Uuid, input: UpdateAppointmentInput) -> Result<appointment::Model, ActionError> {
    let found = programmed(db, id).await?;
    if let Some(tid) = input.therapist_id {
        require_therapist(db, tid).await?;
    }
    let mut am: appointment::ActiveModel = found.into();
    if let Some(date) = input.date {
        am.date = Set(date);
    }
    if input.description.is_some() {
        am.description = Set(non_blank(input.description));
    }
    if input.therapist_id.is_some() {
        am.therapist_id = Set(input.therapist_id);
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(appointment_id = %id, "appointment_updated");
    Ok(updated)
}

/// Cancel a PROGRAMMED appointment; completed ones are history.
#[instrument(skip(db), fields(appointment_id = %id))]
pub async fn delete_appointment(db: &DatabaseConnection, id: Uuid) -> Result<(), ActionError> {
    programmed(db, id).await?;
    let txn = db.begin().await?;
    appointment_patient::Entity::delete_many()
        .filter(appointment_patient::Column::AppointmentId.eq(id))
        .exec(&txn)
        .await?;
    appointment::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(appointment_id = %id, "appointment_deleted");
    Ok(())
}

pub async fn get_appointment(db: &DatabaseConnection, id: Uuid) -> Result<Option<AppointmentDetail>, ActionError> {
    let Some(found) = appointment::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let mut patients = patient_ids_by_appointment(db, &[id]).await?;
    Ok(Some(AppointmentDetail { patient_ids: patients.remove(&id).unwrap_or_default(), appointment: found }))
}

/// Appointments ordered by date.
pub async fn list_appointments(db: &DatabaseConnection, filter: AppointmentFilter) -> Result<Vec<AppointmentDetail>, ActionError> {
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from > to {
            return Err(ActionError::Validation("from must not be after to".into()));
        }
    }
    let mut query = appointment::Entity::find()
        .order_by_asc(appointment::Column::Date)
        .order_by_asc(appointment::Column::Id);
    if let Some(from) = filter.from {
        query = query.filter(appointment::Column::Date.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(appointment::Column::Date.lte(to));
    }
    if let Some(tid) = filter.therapist_id {
        query = query.filter(appointment::Column::TherapistId.eq(tid));
    }
    if let Some(status) = filter.status {
        query = query.filter(appointment::Column::Status.eq(status.as_str()));
    }
    if let Some(pid) = filter.patient_id {
        query = query
            .inner_join(appointment_patient::Entity)
            .filter(appointment_patient::Column::PatientId.eq(pid));
    }
    let rows = query.all(db).await?;
    let ids: Vec<Uuid> = rows.iter().map(|a| a.id).collect();
    let mut patients = patient_ids_by_appointment(db, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|a| AppointmentDetail { patient_ids: patients.remove(&a.id).unwrap_or_default(), appointment: a })
        .collect())
}

async fn programmed<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<appointment::Model, ActionError> {
    let found = appointment::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ActionError::not_found("appointment"))?;
    if found.is_done() {
        return Err(ActionError::rule("appointment already completed"));
    }
    Ok(found)
}

async fn patient_ids_by_appointment<C: ConnectionTrait>(db: &C, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Uuid>>, ActionError> {
    let mut out: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    if ids.is_empty() {
        return Ok(out);
    }
    let links = appointment_patient::Entity::find()
        .filter(appointment_patient::Column::AppointmentId.is_in(ids.iter().copied()))
        .all(db)
        .await?;
    for link in links {
        out.entry(link.appointment_id).or_default().push(link.patient_id);
    }
    Ok(out)
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
