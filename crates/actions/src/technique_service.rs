//! Techniques and which therapists practice them.

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::enums::TechniqueLevel;
use models::{service_technique, technique, user, user_technique};

use crate::errors::ActionError;
use crate::user_service::{require_therapist, require_therapists};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TechniqueInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A technique together with the therapist's standing in it.
#[derive(Clone, Debug, Serialize)]
pub struct TherapistTechnique {
    #[serde(flatten)]
    pub technique: technique::Model,
    pub status: String,
}

#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_technique(db: &DatabaseConnection, input: TechniqueInput) -> Result<technique::Model, ActionError> {
    let created = technique::create(db, &input.name, input.description.as_deref()).await?;
    info!(technique_id = %created.id, "technique_created");
    Ok(created)
}

#[instrument(skip(db, input), fields(technique_id = %id))]
pub async fn update_technique(db: &DatabaseConnection, id: Uuid, input: TechniqueInput) -> Result<technique::Model, ActionError> {
    technique::validate_name(&input.name)?;
    let mut am: technique::ActiveModel = technique::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ActionError::not_found("technique"))?
        .into();
    am.name = Set(input.name.trim().to_string());
    am.description = Set(input.description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()));
    let updated = am.update(db).await?;
    info!(technique_id = %id, "technique_updated");
    Ok(updated)
}

pub async fn get_technique(db: &DatabaseConnection, id: Uuid) -> Result<Option<technique::Model>, ActionError> {
    Ok(technique::Entity::find_by_id(id).one(db).await?)
}

pub async fn list_techniques(db: &DatabaseConnection) -> Result<Vec<technique::Model>, ActionError> {
    Ok(technique::Entity::find().order_by_asc(technique::Column::Name).all(db).await?)
}

/// Delete a technique no service relies on; therapist links go with it.
#[instrument(skip(db), fields(technique_id = %id))]
pub async fn delete_technique(db: &DatabaseConnection, id: Uuid) -> Result<(), ActionError> {
    technique::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ActionError::not_found("technique"))?;
    let in_use = service_technique::Entity::find()
        .filter(service_technique::Column::TechniqueId.eq(id))
        .count(db)
        .await?;
    if in_use > 0 {
        return Err(ActionError::rule(format!("technique is used by {in_use} service(s)")));
    }

    let txn = db.begin().await?;
    user_technique::Entity::delete_many()
        .filter(user_technique::Column::TechniqueId.eq(id))
        .exec(&txn)
        .await?;
    technique::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(technique_id = %id, "technique_deleted");
    Ok(())
}

/// Link therapists to a technique, skipping pairs that already exist.
///
/// Returns how many links were inserted.
#[instrument(skip(db, user_ids), fields(technique_id = %technique_id, requested = user_ids.len()))]
pub async fn assign_therapists_to_technique(
    db: &DatabaseConnection,
    technique_id: Uuid,
    user_ids: Vec<Uuid>,
    level: TechniqueLevel,
) -> Result<u64, ActionError> {
    let user_ids = crate::dedup_ids(user_ids);
    technique::Entity::find_by_id(technique_id)
        .one(db)
        .await?
        .ok_or_else(|| ActionError::not_found("technique"))?;
    require_therapists(db, &user_ids).await?;

    let existing: HashSet<Uuid> = user_technique::Entity::find()
        .filter(user_technique::Column::TechniqueId.eq(technique_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.user_id)
        .collect();

    let now = Utc::now().into();
    let rows: Vec<user_technique::ActiveModel> = user_ids
        .into_iter()
        .filter(|uid| !existing.contains(uid))
        .map(|uid| user_technique::ActiveModel {
            user_id: Set(uid),
            technique_id: Set(technique_id),
            status: Set(level.as_str().to_string()),
            created_at: Set(now),
        })
        .collect();
    let inserted = rows.len() as u64;
    if inserted > 0 {
        user_technique::Entity::insert_many(rows).exec_without_returning(db).await?;
    }

    info!(technique_id = %technique_id, inserted, "therapists_assigned");
    Ok(inserted)
}

/// Replace the whole technique set of a therapist.
#[instrument(skip(db, technique_ids), fields(user_id = %user_id, techniques = technique_ids.len()))]
pub async fn assign_techniques_to_therapist(
    db: &DatabaseConnection,
    user_id: Uuid,
    technique_ids: Vec<Uuid>,
    level: TechniqueLevel,
) -> Result<Vec<user_technique::Model>, ActionError> {
    let technique_ids = crate::dedup_ids(technique_ids);

    let txn = db.begin().await?;
    require_therapist(&txn, user_id).await?;
    require_techniques(&txn, &technique_ids).await?;

    user_technique::Entity::delete_many()
        .filter(user_technique::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;

    let now = Utc::now().into();
    let mut links = Vec::with_capacity(technique_ids.len());
    for tid in &technique_ids {
        let link = user_technique::ActiveModel {
            user_id: Set(user_id),
            technique_id: Set(*tid),
            status: Set(level.as_str().to_string()),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;
        links.push(link);
    }
    txn.commit().await?;

    info!(user_id = %user_id, techniques = links.len(), "techniques_assigned");
    Ok(links)
}

pub async fn list_therapists_for_technique(db: &DatabaseConnection, technique_id: Uuid) -> Result<Vec<user::Model>, ActionError> {
    let user_ids: Vec<Uuid> = user_technique::Entity::find()
        .filter(user_technique::Column::TechniqueId.eq(technique_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.user_id)
        .collect();
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .order_by_asc(user::Column::Name)
        .all(db)
        .await?;
    Ok(users)
}

pub async fn list_techniques_for_therapist(db: &DatabaseConnection, user_id: Uuid) -> Result<Vec<TherapistTechnique>, ActionError> {
    let links = user_technique::Entity::find()
        .filter(user_technique::Column::UserId.eq(user_id))
        .find_also_related(technique::Entity)
        .all(db)
        .await?;
    let mut out: Vec<TherapistTechnique> = links
        .into_iter()
        .filter_map(|(link, t)| t.map(|technique| TherapistTechnique { technique, status: link.status }))
        .collect();
    out.sort_by(|a, b| a.technique.name.cmp(&b.technique.name));
    Ok(out)
}

/// Every id must name an existing technique.
pub(crate) async fn require_techniques<C: ConnectionTrait>(db: &C, ids: &[Uuid]) -> Result<(), ActionError> {
    if ids.is_empty() {
        return Ok(());
    }
    let found = technique::Entity::find()
        .filter(technique::Column::Id.is_in(ids.iter().copied()))
        .count(db)
        .await?;
    if found != ids.len() as u64 {
        return Err(ActionError::not_found("technique"));
    }
    Ok(())
}
