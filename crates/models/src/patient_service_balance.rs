use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{patient, sale, service};

/// Prepaid session credits of one patient for one service.
///
/// Invariant: `0 <= used <= total`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "patient_service_balance")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub patient_id: Uuid,
    pub service_id: Uuid,
    pub sale_id: Option<Uuid>,
    pub total: i32,
    pub used: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Patient, Service, Sale }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Patient => Entity::belongs_to(patient::Entity)
                .from(Column::PatientId)
                .to(patient::Column::Id)
                .into(),
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .into(),
            Relation::Sale => Entity::belongs_to(sale::Entity)
                .from(Column::SaleId)
                .to(sale::Column::Id)
                .into(),
        }
    }
}

impl Related<service::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn remaining(&self) -> i32 {
        self.total - self.used
    }

    pub fn is_available(&self) -> bool {
        self.used < self.total
    }
}
