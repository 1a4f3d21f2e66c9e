use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use tracing::{info, instrument};
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::patient::{self, PatientFields};
use models::{patient_service_balance, sale};

use crate::errors::ActionError;

/// Register a new patient.
#[instrument(skip(db, fields))]
pub async fn create_patient(db: &DatabaseConnection, fields: PatientFields) -> Result<patient::Model, ActionError> {
    fields.validate()?;
    let now = Utc::now().into();
    let mut am = patient::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    fields.apply(&mut am);
    let created = am.insert(db).await?;
    info!(patient_id = %created.id, "patient_created");
    Ok(created)
}

/// Replace the demographic and contact fields of a patient.
#[instrument(skip(db, fields), fields(patient_id = %id))]
pub async fn update_patient(db: &DatabaseConnection, id: Uuid, fields: PatientFields) -> Result<patient::Model, ActionError> {
    fields.validate()?;
    let mut am: patient::ActiveModel = patient::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ActionError::not_found("patient"))?
        .into();
    fields.apply(&mut am);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(patient_id = %id, "patient_updated");
    Ok(updated)
}

pub async fn get_patient(db: &DatabaseConnection, id: Uuid) -> Result<Option<patient::Model>, ActionError> {
    Ok(patient::Entity::find_by_id(id).one(db).await?)
}

/// Patients ordered by last then first name; `search` matches either name.
pub async fn list_patients(db: &DatabaseConnection, search: Option<&str>, opts: Pagination) -> Result<Page<patient::Model>, ActionError> {
    let (page_idx, per_page) = opts.normalize();
    let mut query = patient::Entity::find()
        .order_by_asc(patient::Column::LastName)
        .order_by_asc(patient::Column::FirstName);
    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(patient::Column::FirstName.contains(term))
                .add(patient::Column::LastName.contains(term)),
        );
    }
    let paginator = query.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page { items, page: opts.page_number(), per_page: per_page as u32, total })
}

/// Delete a patient with no purchase history.
#[instrument(skip(db), fields(patient_id = %id))]
pub async fn delete_patient(db: &DatabaseConnection, id: Uuid) -> Result<(), ActionError> {
    patient::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ActionError::not_found("patient"))?;
    let sales = sale::Entity::find().filter(sale::Column::PatientId.eq(id)).count(db).await?;
    let balances = patient_service_balance::Entity::find()
        .filter(patient_service_balance::Column::PatientId.eq(id))
        .count(db)
        .await?;
    if sales > 0 || balances > 0 {
        return Err(ActionError::rule("cannot delete a patient with sales or balances"));
    }
    patient::Entity::delete_by_id(id).exec(db).await?;
    info!(patient_id = %id, "patient_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, get_db};

    fn fields(first: &str, last: &str) -> PatientFields {
        PatientFields { first_name: first.into(), last_name: last.into(), ..Default::default() }
    }

    #[tokio::test]
    async fn patient_crud_and_search() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let lucia = create_patient(&db, fields("Lucia", "Gomez")).await?;
        create_patient(&db, fields("Pedro", "Alvarez")).await?;
        create_patient(&db, fields("Marta", "Zamora")).await?;

        let page = list_patients(&db, None, Pagination { page: 1, per_page: 2 }).await?;
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].last_name, "Alvarez");

        let found = list_patients(&db, Some("gom"), Pagination::default()).await?;
        assert_eq!(found.total, 1);

        let updated = update_patient(
            &db,
            lucia.id,
            PatientFields { phone: Some(" 555-0101 ".into()), ..fields("Lucia", "Gomez Ruiz") },
        )
        .await?;
        assert_eq!(updated.last_name, "Gomez Ruiz");
        assert_eq!(updated.phone.as_deref(), Some("555-0101"));

        delete_patient(&db, lucia.id).await?;
        assert!(get_patient(&db, lucia.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_patient_is_rejected_before_write() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let err = create_patient(&db, PatientFields { email: Some("nope".into()), ..fields("Lucia", "Gomez") }).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(list_patients(&db, None, Pagination::default()).await?.total, 0);
        Ok(())
    }

    #[tokio::test]
    async fn patient_with_balance_cannot_be_deleted() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let p = test_support::patient(&db, "Julia").await?;
        let svc = test_support::service(&db, "Massage").await?;
        test_support::balance(&db, p.id, svc.id, 1, 0, test_support::at(2)).await?;
        assert!(matches!(delete_patient(&db, p.id).await, Err(ActionError::Rule(_))));
        Ok(())
    }
}
