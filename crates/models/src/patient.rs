use sea_orm::{entity::prelude::*, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, validate};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "patient")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<Date>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Demographic and contact fields accepted on create and update.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PatientFields {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<Date>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl PatientFields {
    pub fn validate(&self) -> Result<(), errors::ModelError> {
        validate::min_len("first_name", &self.first_name, 2)?;
        validate::min_len("last_name", &self.last_name, 2)?;
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            validate::email(email)?;
        }
        if let Some(dob) = self.date_of_birth {
            if dob > Utc::now().date_naive() {
                return Err(errors::ModelError::Validation("date_of_birth cannot be in the future".into()));
            }
        }
        Ok(())
    }

    /// Copy validated fields onto an active model, blank optionals become NULL.
    pub fn apply(self, am: &mut ActiveModel) {
        am.first_name = Set(self.first_name.trim().to_string());
        am.last_name = Set(self.last_name.trim().to_string());
        am.date_of_birth = Set(self.date_of_birth);
        am.gender = Set(non_blank(self.gender));
        am.phone = Set(non_blank(self.phone));
        am.email = Set(non_blank(self.email));
        am.address = Set(non_blank(self.address));
        am.notes = Set(non_blank(self.notes));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> PatientFields {
        PatientFields { first_name: "Lucia".into(), last_name: "Gomez".into(), ..Default::default() }
    }

    #[test]
    fn validates_names_and_optional_email() {
        assert!(fields().validate().is_ok());
        let short = PatientFields { first_name: "L".into(), ..fields() };
        assert!(short.validate().is_err());
        let bad_mail = PatientFields { email: Some("nope".into()), ..fields() };
        assert!(bad_mail.validate().is_err());
        let blank_mail = PatientFields { email: Some("   ".into()), ..fields() };
        assert!(blank_mail.validate().is_ok());
    }

    #[test]
    fn apply_nulls_blank_optionals() {
        let mut am = ActiveModel { ..Default::default() };
        PatientFields { phone: Some("  ".into()), notes: Some(" prefers mornings ".into()), ..fields() }.apply(&mut am);
        assert_eq!(am.phone, Set(None));
        assert_eq!(am.notes, Set(Some("prefers mornings".into())));
    }
}
