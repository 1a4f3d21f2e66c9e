//! Service catalog: create, update, delete and activate/deactivate services.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::enums::CatalogStatus;
use models::{appointment, package_item, patient_service_balance, sale, service, service_technique};

use crate::errors::ActionError;
use crate::technique_service::require_techniques;

/// Create/update payload; `technique_ids` must name at least one technique.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub duration: i32,
    pub technique_ids: Vec<Uuid>,
}

impl ServiceInput {
    pub fn validate(&self) -> Result<(), ActionError> {
        service::validate_name(&self.name)?;
        service::validate_description(&self.description)?;
        service::validate_price(self.price)?;
        service::validate_duration(self.duration)?;
        if self.technique_ids.is_empty() {
            return Err(ActionError::Validation("technique_ids must contain at least one technique".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ServiceWithTechniques {
    #[serde(flatten)]
    pub service: service::Model,
    pub technique_ids: Vec<Uuid>,
}

/// Create a service and connect it to its techniques.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_service(db: &DatabaseConnection, input: ServiceInput) -> Result<ServiceWithTechniques, ActionError> {
    input.validate()?;
    let technique_ids = crate::dedup_ids(input.technique_ids);

    let txn = db.begin().await?;
    require_techniques(&txn, &technique_ids).await?;

    let now = Utc::now().into();
    let created = service::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name.trim().to_string()),
        description: Set(input.description.trim().to_string()),
        price: Set(input.price),
        duration: Set(input.duration),
        status: Set(CatalogStatus::Active.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    link_techniques(&txn, created.id, &technique_ids).await?;
    txn.commit().await?;

    info!(service_id = %created.id, techniques = technique_ids.len(), "service_created");
    Ok(ServiceWithTechniques { service: created, technique_ids })
}

/// Update a service; its technique set is replaced by `input.technique_ids`.
#[instrument(skip(db, input), fields(service_id = %id))]
pub async fn update_service(db: &DatabaseConnection, id: Uuid, input: ServiceInput) -> Result<ServiceWithTechniques, ActionError> {
    input.validate()?;
    let technique_ids = crate::dedup_ids(input.technique_ids);

    let txn = db.begin().await?;
    let mut am: service::ActiveModel = service::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ActionError::not_found("service"))?
        .into();
    require_techniques(&txn, &technique_ids).await?;

    am.name = Set(input.name.trim().to_string());
    am.description = Set(input.description.trim().to_string());
    am.price = Set(input.price);
    am.duration = Set(input.duration);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(&txn).await?;

    service_technique::Entity::delete_many()
        .filter(service_technique::Column::ServiceId.eq(id))
        .exec(&txn)
        .await?;
    link_techniques(&txn, id, &technique_ids).await?;
    txn.commit().await?;

    info!(service_id = %id, "service_updated");
    Ok(ServiceWithTechniques { service: updated, technique_ids })
}

/// Delete a service that was never booked nor sold.
///
/// Services with appointments, sales or balances must be deactivated instead.
#[instrument(skip(db), fields(service_id = %id))]
pub async fn delete_service(db: &DatabaseConnection, id: Uuid) -> Result<(), ActionError> {
    let txn = db.begin().await?;
    service::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ActionError::not_found("service"))?;

    let appointments = appointment::Entity::find()
        .filter(appointment::Column::ServiceId.eq(id))
        .count(&txn)
        .await?;
    let balances = patient_service_balance::Entity::find()
        .filter(patient_service_balance::Column::ServiceId.eq(id))
        .count(&txn)
        .await?;
    let sales = sale::Entity::find()
        .filter(sale::Column::ServiceId.eq(id))
        .count(&txn)
        .await?;
    if appointments > 0 || balances > 0 || sales > 0 {
        return Err(ActionError::rule(
            "cannot delete a service that has appointments, sales or balances; deactivate it instead",
        ));
    }
    let bundled = package_item::Entity::find()
        .filter(package_item::Column::ServiceId.eq(id))
        .count(&txn)
        .await?;
    if bundled > 0 {
        return Err(ActionError::rule("cannot delete a service bundled in a package; remove it from the package first"));
    }

    service_technique::Entity::delete_many()
        .filter(service_technique::Column::ServiceId.eq(id))
        .exec(&txn)
        .await?;
    service::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    info!(service_id = %id, "service_deleted");
    Ok(())
}

/// Flip ACTIVE <-> INACTIVE.
#[instrument(skip(db), fields(service_id = %id))]
pub async fn toggle_service_status(db: &DatabaseConnection, id: Uuid) -> Result<service::Model, ActionError> {
    let found = service::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ActionError::not_found("service"))?;
    let next = found.status.parse::<CatalogStatus>()?.toggled();

    let mut am: service::ActiveModel = found.into();
    am.status = Set(next.as_str().to_string());
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;

    info!(service_id = %id, status = %next, "service_status_toggled");
    Ok(updated)
}

pub async fn get_service(db: &DatabaseConnection, id: Uuid) -> Result<Option<ServiceWithTechniques>, ActionError> {
    let Some(found) = service::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let mut links = technique_ids_by_service(db, &[id]).await?;
    Ok(Some(ServiceWithTechniques { technique_ids: links.remove(&id).unwrap_or_default(), service: found }))
}

/// All services ordered by name, optionally restricted to one status.
pub async fn list_services(db: &DatabaseConnection, status: Option<CatalogStatus>) -> Result<Vec<ServiceWithTechniques>, ActionError> {
    let mut query = service::Entity::find().order_by_asc(service::Column::Name);
    if let Some(s) = status {
        query = query.filter(service::Column::Status.eq(s.as_str()));
    }
    let rows = query.all(db).await?;
    let ids: Vec<Uuid> = rows.iter().map(|s| s.id).collect();
    let mut links = technique_ids_by_service(db, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|s| ServiceWithTechniques { technique_ids: links.remove(&s.id).unwrap_or_default(), service: s })
        .collect())
}

/// Services offered in new-appointment and new-sale pickers.
pub async fn list_active_services(db: &DatabaseConnection) -> Result<Vec<ServiceWithTechniques>, ActionError> {
    list_services(db, Some(CatalogStatus::Active)).await
}

/// Load a service and require it to be ACTIVE.
pub(crate) async fn require_active_service<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<service::Model, ActionError> {
    let found = service::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ActionError::not_found("service"))?;
    if !found.is_active() {
        return Err(ActionError::rule(format!("service '{}' is inactive", found.name)));
    }
    Ok(found)
}

async fn link_techniques<C: ConnectionTrait>(db: &C, service_id: Uuid, technique_ids: &[Uuid]) -> Result<(), ActionError> {
    if technique_ids.is_empty() {
        return Ok(());
    }
    let rows = technique_ids.iter().map(|tid| service_technique::ActiveModel {
        service_id: Set(service_id),
        technique_id: Set(*tid),
    });
    service_technique::Entity::insert_many(rows).exec_without_returning(db).await?;
    Ok(())
}

async fn technique_ids_by_service<C: ConnectionTrait>(db: &C, service_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Uuid>>, ActionError> {
    let mut out: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    if service_ids.is_empty() {
        return Ok(out);
    }
    let links = service_technique::Entity::find()
        .filter(service_technique::Column::ServiceId.is_in(service_ids.iter().copied()))
        .all(db)
        .await?;
    for link in links {
        out.entry(link.service_id).or_default().push(link.technique_id);
    }
    Ok(out)
}
