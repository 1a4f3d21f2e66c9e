use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use actions::catalog_service::{self, ServiceInput, ServiceWithTechniques};
use models::enums::CatalogStatus;
use models::service;

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    /// `ACTIVE` or `INACTIVE`; omitted lists both.
    #[param(value_type = Option<String>)]
    pub status: Option<CatalogStatus>,
}

#[utoipa::path(get, path = "/services", tag = "services", params(ListQuery), responses((status = 200, description = "List OK")))]
pub async fn list(State(state): State<ServerState>, ApiQuery(q): ApiQuery<ListQuery>) -> Result<Json<Vec<ServiceWithTechniques>>, JsonApiError> {
    Ok(Json(catalog_service::list_services(&state.db, q.status).await?))
}

#[utoipa::path(get, path = "/services/active", tag = "services", responses((status = 200, description = "Services open for booking and sale")))]
pub async fn list_active(State(state): State<ServerState>) -> Result<Json<Vec<ServiceWithTechniques>>, JsonApiError> {
    Ok(Json(catalog_service::list_active_services(&state.db).await?))
}

#[utoipa::path(post, path = "/services", tag = "services", request_body = crate::openapi::ServiceRequest, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 404, description = "Unknown technique")))]
pub async fn create(State(state): State<ServerState>, ApiJson(input): ApiJson<ServiceInput>) -> Result<(StatusCode, Json<ServiceWithTechniques>), JsonApiError> {
    let created = catalog_service::create_service(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/services/{id}", tag = "services", params(("id" = Uuid, Path, description = "Service ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<ServiceWithTechniques>, JsonApiError> {
    catalog_service::get_service(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found("service"))
}

#[utoipa::path(put, path = "/services/{id}", tag = "services", params(("id" = Uuid, Path, description = "Service ID")), request_body = crate::openapi::ServiceRequest, responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found")))]
pub async fn update(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>, ApiJson(input): ApiJson<ServiceInput>) -> Result<Json<ServiceWithTechniques>, JsonApiError> {
    Ok(Json(catalog_service::update_service(&state.db, id, input).await?))
}

#[utoipa::path(delete, path = "/services/{id}", tag = "services", params(("id" = Uuid, Path, description = "Service ID")), responses((status = 204, description = "Deleted"), (status = 409, description = "Service is in use")))]
pub async fn delete(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<StatusCode, JsonApiError> {
    catalog_service::delete_service(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/services/{id}/toggle-status", tag = "services", params(("id" = Uuid, Path, description = "Service ID")), responses((status = 200, description = "Status flipped"), (status = 404, description = "Not Found")))]
pub async fn toggle_status(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<service::Model>, JsonApiError> {
    Ok(Json(catalog_service::toggle_service_status(&state.db, id).await?))
}
