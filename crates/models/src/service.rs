use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::enums::CatalogStatus;
use crate::{errors, validate};

/// A bookable therapy service (e.g. a 60 minute massage).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: f64,
    /// Minutes.
    pub duration: i32,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_active(&self) -> bool {
        self.status == CatalogStatus::Active.as_str()
    }
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    validate::min_len("name", name, 3)
}

pub fn validate_description(description: &str) -> Result<(), errors::ModelError> {
    validate::min_len("description", description, 10)
}

pub fn validate_price(price: f64) -> Result<(), errors::ModelError> {
    validate::money("price", price)
}

pub fn validate_duration(duration: i32) -> Result<(), errors::ModelError> {
    validate::positive("duration", duration)
}
