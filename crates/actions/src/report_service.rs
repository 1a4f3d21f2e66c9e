use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use uuid::Uuid;

use models::appointment;
use models::enums::{AppointmentStatus, Evaluation};

use crate::errors::ActionError;
use crate::user_service::require_therapist;

/// Appointment counts of one therapist over a date range.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TherapistPerformance {
    pub therapist_id: Uuid,
    pub total: u64,
    pub programmed: u64,
    pub done: u64,
    pub under_evaluation: u64,
    pub approved: u64,
    pub rejected: u64,
}

impl TherapistPerformance {
    fn tally(&mut self, a: &appointment::Model) {
        self.total += 1;
        match a.status.parse::<AppointmentStatus>() {
            Ok(AppointmentStatus::Programmed) => self.programmed += 1,
            Ok(AppointmentStatus::Done) => self.done += 1,
            Err(_) => {}
        }
        match a.evaluation.as_deref().map(str::parse::<Evaluation>) {
            Some(Ok(Evaluation::UnderEvaluation)) => self.under_evaluation += 1,
            Some(Ok(Evaluation::Approved)) => self.approved += 1,
            Some(Ok(Evaluation::Rejected)) => self.rejected += 1,
            _ => {}
        }
    }
}

pub async fn therapist_performance(
    db: &DatabaseConnection,
    user_id: Uuid,
    from: DateTimeWithTimeZone,
    to: DateTimeWithTimeZone,
) -> Result<TherapistPerformance, ActionError> {
    if from > to {
        return Err(ActionError::Validation("from must not be after to".into()));
    }
    require_therapist(db, user_id).await?;
    let rows = appointment::Entity::find()
        .filter(appointment::Column::TherapistId.eq(user_id))
        .filter(appointment::Column::Date.gte(from))
        .filter(appointment::Column::Date.lte(to))
        .all(db)
        .await?;

    let mut report = TherapistPerformance { therapist_id: user_id, ..Default::default() };
    for a in &rows {
        report.tally(a);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointment_service::{complete_appointment, create_appointment, evaluate_appointment, CreateAppointmentInput};
    use crate::test_support::{self, at, get_db};
    use models::enums::AppointmentMode;

    #[tokio::test]
    async fn counts_by_status_and_evaluation() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let tom = test_support::therapist(&db, "Tom").await?;
        let svc = test_support::service(&db, "Massage").await?;
        let p = test_support::patient(&db, "Ana").await?;
        test_support::balance(&db, p.id, svc.id, 10, 0, at(1)).await?;

        let mut ids = Vec::new();
        for day in [5, 6, 7, 25] {
            let input = CreateAppointmentInput {
                service_id: svc.id,
                patient_ids: vec![p.id],
                date: at(day),
                mode: AppointmentMode::Single,
                description: None,
                therapist_id: Some(tom.id),
            };
            ids.push(create_appointment(&db, input).await?.appointment.id);
        }
        complete_appointment(&db, ids[0], p.id).await?;
        complete_appointment(&db, ids[1], p.id).await?;
        evaluate_appointment(&db, ids[1], Evaluation::Approved).await?;

        let report = therapist_performance(&db, tom.id, at(1), at(20)).await?;
        assert_eq!(
            report,
            TherapistPerformance { therapist_id: tom.id, total: 3, programmed: 1, done: 2, under_evaluation: 1, approved: 1, rejected: 0 }
        );
        assert!(therapist_performance(&db, tom.id, at(20), at(1)).await.unwrap_err().is_validation());
        Ok(())
    }
}
