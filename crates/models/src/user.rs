use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::enums::UserRole;
use crate::{errors, validate};

/// Staff account: therapist, receptionist or administrator.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_therapist(&self) -> bool {
        self.role == UserRole::Therapist.as_str()
    }
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    validate::min_len("name", name, 2)
}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    validate::email(email)
}

pub async fn create<C: ConnectionTrait>(db: &C, email: &str, name: &str, role: UserRole) -> Result<Model, errors::ModelError> {
    validate_email(email)?;
    validate_name(name)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.trim().to_ascii_lowercase()),
        name: Set(name.trim().to_string()),
        role: Set(role.as_str().to_string()),
        status: Set("active".into()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find()
        .filter(Column::Email.eq(email.trim().to_ascii_lowercase()))
        .one(db)
        .await?)
}
