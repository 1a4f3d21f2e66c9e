//! Packages: several services sold together at a fixed price.

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
use models::{package, package_item, sale, service, validate};

use crate::errors::ActionError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PackageItemInput {
    pub service_id: Uuid,
    pub sessions: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PackageInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub items: Vec<PackageItemInput>,
}

impl PackageInput {
    pub fn validate(&self) -> Result<(), ActionError> {
        validate::min_len("name", &self.name, 3)?;
        validate::money("price", self.price)?;
        if self.items.is_empty() {
            return Err(ActionError::Validation("items must contain at least one service".into()));
        }
        for item in &self.items {
            validate::positive("sessions", item.sessions)?;
        }
        let ids = crate::dedup_ids(self.items.iter().map(|i| i.service_id).collect());
        if ids.len() != self.items.len() {
            return Err(ActionError::Validation("items must not repeat a service".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PackageWithItems {
    #[serde(flatten)]
    pub package: package::Model,
    pub items: Vec<package_item::Model>,
}

#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_package(db: &DatabaseConnection, input: PackageInput) -> Result<PackageWithItems, ActionError> {
    input.validate()?;
    let txn = db.begin().await?;
    require_services(&txn, &input.items).await?;

    let now = Utc::now().into();
    let created = package::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name.trim().to_string()),
        description: Set(input.description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())),
        price: Set(input.price),
        status: Set(CatalogStatus::Active.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    let items = insert_items(&txn, created.id, &input.items).await?;
    txn.commit().await?;

    info!(package_id = %created.id, items = items.len(), "package_created");
    Ok(PackageWithItems { package: created, items })
}

/// Update a package; its bundled services are replaced by `input.items`.
#[instrument(skip(db, input), fields(package_id = %id))]
pub async fn update_package(db: &DatabaseConnection, id: Uuid, input: PackageInput) -> Result<PackageWithItems, ActionError> {
    input.validate()?;
    let txn = db.begin().await?;
    let mut am: package::ActiveModel = package::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ActionError::not_found("package"))?
        .into();
    require_services(&txn, &input.items).await?;

    am.name = Set(input.name.trim().to_string());
    am.description = Set(input.description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()));
    am.price = Set(input.price);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(&txn).await?;

    package_item::Entity::delete_many()
        .filter(package_item::Column::PackageId.eq(id))
        .exec(&txn)
        .await?;
    let items = insert_items(&txn, id, &input.items).await?;
    txn.commit().await?;

    info!(package_id = %id, "package_updated");
    Ok(PackageWithItems { package: updated, items })
}

#[instrument(skip(db), fields(package_id = %id))]
pub async fn toggle_package_status(db: &DatabaseConnection, id: Uuid) -> Result<package::Model, ActionError> {
    let found = package::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ActionError::not_found("package"))?;
    let next = found.status.parse::<CatalogStatus>()?.toggled();
    let mut am: package::ActiveModel = found.into();
    am.status = Set(next.as_str().to_string());
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(package_id = %id, status = %next, "package_status_toggled");
    Ok(updated)
}

/// Delete a package that was never sold.
#[instrument(skip(db), fields(package_id = %id))]
pub async fn delete_package(db: &DatabaseConnection, id: Uuid) -> Result<(), ActionError> {
    package::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ActionError::not_found("package"))?;
    let sold = sale::Entity::find().filter(sale::Column::PackageId.eq(id)).count(db).await?;
    if sold > 0 {
        return Err(ActionError::rule("cannot delete a package that has been sold; deactivate it instead"));
    }
    // items cascade
    package::Entity::delete_by_id(id).exec(db).await?;
    info!(package_id = %id, "package_deleted");
    Ok(())
}

pub async fn get_package(db: &DatabaseConnection, id: Uuid) -> Result<Option<PackageWithItems>, ActionError> {
    let Some(found) = package::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let items = package_items(db, found.id).await?;
    Ok(Some(PackageWithItems { package: found, items }))
}

pub async fn list_packages(db: &DatabaseConnection, status: Option<CatalogStatus>) -> Result<Vec<PackageWithItems>, ActionError> {
    let mut query = package::Entity::find().order_by_asc(package::Column::Name);
    if let Some(s) = status {
        query = query.filter(package::Column::Status.eq(s.as_str()));
    }
    let packages = query.all(db).await?;
    if packages.is_empty() {
        return Ok(Vec::new());
    }
    let mut by_package: HashMap<Uuid, Vec<package_item::Model>> = HashMap::new();
    for item in package_item::Entity::find()
        .filter(package_item::Column::PackageId.is_in(packages.iter().map(|p| p.id)))
        .all(db)
        .await?
    {
        by_package.entry(item.package_id).or_default().push(item);
    }
    Ok(packages
        .into_iter()
        .map(|p| PackageWithItems { items: by_package.remove(&p.id).unwrap_or_default(), package: p })
        .collect())
}

pub(crate) async fn package_items<C: ConnectionTrait>(db: &C, package_id: Uuid) -> Result<Vec<package_item::Model>, ActionError> {
    Ok(package_item::Entity::find()
        .filter(package_item::Column::PackageId.eq(package_id))
        .all(db)
        .await?)
}

async fn require_services<C: ConnectionTrait>(db: &C, items: &[PackageItemInput]) -> Result<(), ActionError> {
    let found = service::Entity::find()
        .filter(service::Column::Id.is_in(items.iter().map(|i| i.service_id)))
        .count(db)
        .await?;
    if found != items.len() as u64 {
        return Err(ActionError::not_found("service"));
    }
    Ok(())
}

async fn insert_items<C: ConnectionTrait>(db: &C, package_id: Uuid, items: &[PackageItemInput]) -> Result<Vec<package_item::Model>, ActionError> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let row = package_item::ActiveModel {
            package_id: Set(package_id),
            service_id: Set(item.service_id),
            sessions: Set(item.sessions),
        }
        .insert(db)
        .await?;
        out.push(row);
    }
    Ok(out)
}
