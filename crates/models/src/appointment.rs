use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::enums::AppointmentStatus;
use crate::{appointment_patient, service, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "appointment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_id: Uuid,
    pub therapist_id: Option<Uuid>,
    pub date: DateTimeWithTimeZone,
    pub description: Option<String>,
    pub mode: String,
    pub status: String,
    /// NULL until the appointment is completed.
    pub evaluation: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Service, Therapist }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .into(),
            Relation::Therapist => Entity::belongs_to(user::Entity)
                .from(Column::TherapistId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<service::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl Related<appointment_patient::Entity> for Entity {
    fn to() -> RelationDef { appointment_patient::Relation::Appointment.def().rev() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_done(&self) -> bool {
        self.status == AppointmentStatus::Done.as_str()
    }
}
