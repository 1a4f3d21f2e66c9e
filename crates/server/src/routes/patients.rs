use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use actions::{patient_service, sale_service};
use common::pagination::Pagination;
use common::types::Page;
use models::patient::{self, PatientFields};

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    /// Matches first or last name.
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[utoipa::path(get, path = "/patients", tag = "patients", params(ListQuery), responses((status = 200, description = "List OK")))]
pub async fn list(State(state): State<ServerState>, ApiQuery(q): ApiQuery<ListQuery>) -> Result<Json<Page<patient::Model>>, JsonApiError> {
    let defaults = Pagination::default();
    let opts = Pagination { page: q.page.unwrap_or(defaults.page), per_page: q.per_page.unwrap_or(defaults.per_page) };
    Ok(Json(patient_service::list_patients(&state.db, q.search.as_deref(), opts).await?))
}

#[utoipa::path(post, path = "/patients", tag = "patients", request_body = crate::openapi::PatientRequest, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error")))]
pub async fn create(State(state): State<ServerState>, ApiJson(input): ApiJson<PatientFields>) -> Result<(StatusCode, Json<patient::Model>), JsonApiError> {
    let created = patient_service::create_patient(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/patients/{id}", tag = "patients", params(("id" = Uuid, Path, description = "Patient ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<patient::Model>, JsonApiError> {
    patient_service::get_patient(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found("patient"))
}

#[utoipa::path(put, path = "/patients/{id}", tag = "patients", params(("id" = Uuid, Path, description = "Patient ID")), request_body = crate::openapi::PatientRequest, responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found")))]
pub async fn update(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>, ApiJson(input): ApiJson<PatientFields>) -> Result<Json<patient::Model>, JsonApiError> {
    Ok(Json(patient_service::update_patient(&state.db, id, input).await?))
}

#[utoipa::path(delete, path = "/patients/{id}", tag = "patients", params(("id" = Uuid, Path, description = "Patient ID")), responses((status = 204, description = "Deleted"), (status = 409, description = "Patient has sales or balances")))]
pub async fn delete(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<StatusCode, JsonApiError> {
    patient_service::delete_patient(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/patients/{id}/balances", tag = "patients", params(("id" = Uuid, Path, description = "Patient ID")), responses((status = 200, description = "Balances in consumption order")))]
pub async fn balances(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<Vec<sale_service::BalanceView>>, JsonApiError> {
    Ok(Json(sale_service::list_balances_for_patient(&state.db, id).await?))
}

#[utoipa::path(get, path = "/patients/{id}/sales", tag = "patients", params(("id" = Uuid, Path, description = "Patient ID")), responses((status = 200, description = "Sales, newest first")))]
pub async fn sales(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<Vec<models::sale::Model>>, JsonApiError> {
    Ok(Json(sale_service::list_sales_for_patient(&state.db, id).await?))
}
