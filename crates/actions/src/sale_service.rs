//! Sales and the prepaid balances they grant.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::enums::SaleType;
use models::{package, patient, patient_service_balance, sale, service, validate};

use crate::catalog_service::require_active_service;
use crate::errors::ActionError;
use crate::package_service::package_items;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateSaleInput {
    pub patient_id: Uuid,
    pub sale_type: SaleType,
    #[serde(default)]
    pub service_id: Option<Uuid>,
    #[serde(default)]
    pub sessions: Option<i32>,
    #[serde(default)]
    pub package_id: Option<Uuid>,
    pub amount: f64,
}

impl CreateSaleInput {
    pub fn validate(&self) -> Result<(), ActionError> {
        validate::money("amount", self.amount)?;
        match self.sale_type {
            SaleType::Service => {
                if self.service_id.is_none() {
                    return Err(ActionError::Validation("service_id is required for SERVICE sales".into()));
                }
                let sessions = self
                    .sessions
                    .ok_or_else(|| ActionError::Validation("sessions is required for SERVICE sales".into()))?;
                validate::positive("sessions", sessions)?;
                if self.package_id.is_some() {
                    return Err(ActionError::Validation("package_id is not allowed for SERVICE sales".into()));
                }
            }
            SaleType::Package => {
                if self.package_id.is_none() {
                    return Err(ActionError::Validation("package_id is required for PACKAGE sales".into()));
                }
                if self.service_id.is_some() || self.sessions.is_some() {
                    return Err(ActionError::Validation("service_id and sessions are not allowed for PACKAGE sales".into()));
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SaleOutcome {
    pub sale: sale::Model,
    pub balances: Vec<patient_service_balance::Model>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BalanceView {
    #[serde(flatten)]
    pub balance: patient_service_balance::Model,
    pub service_name: String,
    pub remaining: i32,
}

/// Record a sale and grant the matching session balances.
#[instrument(skip(db, input), fields(patient_id = %input.patient_id, sale_type = %input.sale_type))]
pub async fn create_sale(db: &DatabaseConnection, input: CreateSaleInput) -> Result<SaleOutcome, ActionError> {
    input.validate()?;

    let txn = db.begin().await?;
    patient::Entity::find_by_id(input.patient_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ActionError::not_found("patient"))?;

    // (service, sessions) pairs to grant
    let grants: Vec<(Uuid, i32)> = match (input.sale_type, input.service_id, input.package_id) {
        (SaleType::Service, Some(service_id), _) => {
            require_active_service(&txn, service_id).await?;
            vec![(service_id, input.sessions.unwrap_or(1))]
        }
        (SaleType::Package, _, Some(package_id)) => {
            let found = package::Entity::find_by_id(package_id)
                .one(&txn)
                .await?
                .ok_or_else(|| ActionError::not_found("package"))?;
            if !found.is_active() {
                return Err(ActionError::rule(format!("package '{}' is inactive", found.name)));
            }
            let items = package_items(&txn, package_id).await?;
            if items.is_empty() {
                return Err(ActionError::rule(format!("package '{}' bundles no services", found.name)));
            }
            items.into_iter().map(|item| (item.service_id, item.sessions)).collect()
        }
        _ => return Err(ActionError::Validation("sale is missing its service or package".into())),
    };

    let now = Utc::now().into();
    let created = sale::ActiveModel {
        id: Set(Uuid::new_v4()),
        patient_id: Set(input.patient_id),
        sale_type: Set(input.sale_type.as_str().to_string()),
        service_id: Set(input.service_id),
        package_id: Set(input.package_id),
        sessions: Set(input.sessions),
        amount: Set(input.amount),
        created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let mut balances = Vec::with_capacity(grants.len());
    for (service_id, sessions) in grants {
        let balance = patient_service_balance::ActiveModel {
            id: Set(Uuid::new_v4()),
            patient_id: Set(input.patient_id),
            service_id: Set(service_id),
            sale_id: Set(Some(created.id)),
            total: Set(sessions),
            used: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        balances.push(balance);
    }
    txn.commit().await?;

    info!(sale_id = %created.id, balances = balances.len(), amount = created.amount, "sale_created");
    Ok(SaleOutcome { sale: created, balances })
}

/// Newest first.
pub async fn list_sales_for_patient(db: &DatabaseConnection, patient_id: Uuid) -> Result<Vec<sale::Model>, ActionError> {
    Ok(sale::Entity::find()
        .filter(sale::Column::PatientId.eq(patient_id))
        .order_by_desc(sale::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Balances in consumption order.
pub async fn list_balances_for_patient(db: &DatabaseConnection, patient_id: Uuid) -> Result<Vec<BalanceView>, ActionError> {
    let rows = patient_service_balance::Entity::find()
        .filter(patient_service_balance::Column::PatientId.eq(patient_id))
        .order_by_asc(patient_service_balance::Column::CreatedAt)
        .order_by_asc(patient_service_balance::Column::Id)
        .find_also_related(service::Entity)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(balance, svc)| BalanceView {
            remaining: balance.remaining(),
            service_name: svc.map(|s| s.name).unwrap_or_default(),
            balance,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, get_db};
    use models::enums::CatalogStatus;
    use sea_orm::PaginatorTrait;

    fn service_sale(patient_id: Uuid, service_id: Uuid, sessions: i32) -> CreateSaleInput {
        CreateSaleInput { patient_id, sale_type: SaleType::Service, service_id: Some(service_id), sessions: Some(sessions), package_id: None, amount: 120.0 }
    }

    #[test]
    fn validate_checks_sale_shape() {
        let (p, s) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(service_sale(p, s, 3).validate().is_ok());
        assert!(service_sale(p, s, 0).validate().is_err());
        assert!(CreateSaleInput { sessions: None, ..service_sale(p, s, 1) }.validate().is_err());
        assert!(CreateSaleInput { amount: 10.001, ..service_sale(p, s, 1) }.validate().is_err());
        let pkg = CreateSaleInput { sale_type: SaleType::Package, service_id: None, sessions: None, package_id: Some(s), ..service_sale(p, s, 1) };
        assert!(pkg.validate().is_ok());
        assert!(CreateSaleInput { sessions: Some(2), ..pkg.clone() }.validate().is_err());
        assert!(CreateSaleInput { package_id: None, ..pkg }.validate().is_err());
    }

    #[tokio::test]
    async fn service_sale_creates_one_fresh_balance() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let p = test_support::patient(&db, "Ana").await?;
        let svc = test_support::service(&db, "Massage").await?;

        let out = create_sale(&db, service_sale(p.id, svc.id, 5)).await?;
        assert_eq!(out.balances.len(), 1);
        assert_eq!(out.balances[0].total, 5);
        assert_eq!(out.balances[0].used, 0);
        assert_eq!(out.balances[0].sale_id, Some(out.sale.id));
        assert_eq!(sale::Entity::find().count(&db).await?, 1);

        let views = list_balances_for_patient(&db, p.id).await?;
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].remaining, 5);
        assert_eq!(views[0].service_name, "Massage");
        assert_eq!(list_sales_for_patient(&db, p.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn package_sale_grants_each_bundled_service() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let p = test_support::patient(&db, "Ana").await?;
        let massage = test_support::service(&db, "Massage").await?;
        let reiki = test_support::service(&db, "Reiki").await?;
        let pkg = test_support::package(&db, "Wellness", &[(massage.id, 4), (reiki.id, 2)], CatalogStatus::Active).await?;

        let out = create_sale(
            &db,
            CreateSaleInput { patient_id: p.id, sale_type: SaleType::Package, service_id: None, sessions: None, package_id: Some(pkg.id), amount: 150.0 },
        )
        .await?;
        let mut totals: Vec<(Uuid, i32)> = out.balances.iter().map(|b| (b.service_id, b.total)).collect();
        totals.sort();
        let mut expected = vec![(massage.id, 4), (reiki.id, 2)];
        expected.sort();
        assert_eq!(totals, expected);
        Ok(())
    }

    #[tokio::test]
    async fn inactive_catalog_items_cannot_be_sold() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let p = test_support::patient(&db, "Ana").await?;
        let old = test_support::inactive_service(&db, "Old massage").await?;
        assert!(matches!(create_sale(&db, service_sale(p.id, old.id, 1)).await, Err(ActionError::Rule(_))));

        let svc = test_support::service(&db, "Massage").await?;
        let pkg = test_support::package(&db, "Retired", &[(svc.id, 1)], CatalogStatus::Inactive).await?;
        let err = create_sale(
            &db,
            CreateSaleInput { patient_id: p.id, sale_type: SaleType::Package, service_id: None, sessions: None, package_id: Some(pkg.id), amount: 10.0 },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ActionError::Rule(_)));
        assert_eq!(sale::Entity::find().count(&db).await?, 0);
        assert_eq!(patient_service_balance::Entity::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn package_without_items_cannot_be_sold() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let p = test_support::patient(&db, "Ana").await?;
        let empty = test_support::package(&db, "Empty", &[], CatalogStatus::Active).await?;

        let err = create_sale(
            &db,
            CreateSaleInput { patient_id: p.id, sale_type: SaleType::Package, service_id: None, sessions: None, package_id: Some(empty.id), amount: 90.0 },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ActionError::Rule(_)));
        assert_eq!(sale::Entity::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn sold_sessions_can_be_consumed() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let p = test_support::patient(&db, "Ana").await?;
        let svc = test_support::service(&db, "Massage").await?;
        create_sale(&db, service_sale(p.id, svc.id, 1)).await?;
        let appt = test_support::programmed_appointment(&db, svc.id, &[p.id]).await?;

        crate::appointment_service::complete_appointment(&db, appt.id, p.id).await?;
        assert_eq!(list_balances_for_patient(&db, p.id).await?[0].remaining, 0);
        Ok(())
    }
}
