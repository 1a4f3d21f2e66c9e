use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::{info, instrument};
use uuid::Uuid;

use models::enums::UserRole;
use models::user;

use crate::errors::ActionError;

/// Create a staff account without credentials.
#[instrument(skip(db), fields(email = %email))]
pub async fn create_user(db: &DatabaseConnection, email: &str, name: &str, role: UserRole) -> Result<user::Model, ActionError> {
    if user::find_by_email(db, email).await?.is_some() {
        return Err(ActionError::rule(format!("a user with email {} already exists", email.trim())));
    }
    let created = user::create(db, email, name, role).await?;
    info!(user_id = %created.id, role = %role, "user_created");
    Ok(created)
}

pub async fn get_user(db: &DatabaseConnection, id: Uuid) -> Result<Option<user::Model>, ActionError> {
    Ok(user::Entity::find_by_id(id).one(db).await?)
}

/// Therapists ordered by name.
pub async fn list_therapists(db: &DatabaseConnection) -> Result<Vec<user::Model>, ActionError> {
    let users = user::Entity::find()
        .filter(user::Column::Role.eq(UserRole::Therapist.as_str()))
        .order_by_asc(user::Column::Name)
        .all(db)
        .await?;
    Ok(users)
}

/// Load a user and require the THERAPIST role.
pub(crate) async fn require_therapist<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<user::Model, ActionError> {
    let found = user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ActionError::not_found("therapist"))?;
    if !found.is_therapist() {
        return Err(ActionError::rule(format!("user {} is not a therapist", found.email)));
    }
    Ok(found)
}

/// Every id must name an existing THERAPIST user.
pub(crate) async fn require_therapists<C: ConnectionTrait>(db: &C, ids: &[Uuid]) -> Result<(), ActionError> {
    if ids.is_empty() {
        return Ok(());
    }
    let found = user::Entity::find()
        .filter(user::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?;
    if found.len() != ids.len() {
        return Err(ActionError::not_found("therapist"));
    }
    if let Some(other) = found.iter().find(|u| !u.is_therapist()) {
        return Err(ActionError::rule(format!("user {} is not a therapist", other.email)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn create_and_list_therapists() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let t = create_user(&db, "zoe@clinic.test", "Zoe Park", UserRole::Therapist).await?;
        let a = create_user(&db, "adam@clinic.test", "Adam Lee", UserRole::Therapist).await?;
        let r = create_user(&db, "desk@clinic.test", "Front Desk", UserRole::Receptionist).await?;

        let names: Vec<String> = list_therapists(&db).await?.into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["Adam Lee", "Zoe Park"]);

        assert!(require_therapist(&db, t.id).await.is_ok());
        assert!(matches!(require_therapist(&db, r.id).await, Err(ActionError::Rule(_))));
        assert!(matches!(require_therapist(&db, Uuid::new_v4()).await, Err(ActionError::NotFound(_))));
        assert!(require_therapists(&db, &[t.id, a.id]).await.is_ok());
        assert!(require_therapists(&db, &[t.id, r.id]).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        create_user(&db, "zoe@clinic.test", "Zoe Park", UserRole::Therapist).await?;
        let err = create_user(&db, "ZOE@clinic.test", "Zoe Again", UserRole::Admin).await.unwrap_err();
        assert!(matches!(err, ActionError::Rule(_)));
        Ok(())
    }
}
