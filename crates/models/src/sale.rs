use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{package, patient, service};

/// A purchase: sessions of one service, or a package.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sale")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub patient_id: Uuid,
    pub sale_type: String,
    pub service_id: Option<Uuid>,
    pub package_id: Option<Uuid>,
    pub sessions: Option<i32>,
    pub amount: f64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Patient, Service, Package }

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
            Relation::Package => Entity::belongs_to(package::Entity)
                .from(Column::PackageId)
                .to(package::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
