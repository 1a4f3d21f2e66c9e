use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use actions::package_service::{self, PackageInput, PackageWithItems};
use models::enums::CatalogStatus;
use models::package;

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    #[param(value_type = Option<String>)]
    pub status: Option<CatalogStatus>,
}

#[utoipa::path(get, path = "/packages", tag = "packages", params(ListQuery), responses((status = 200, description = "List OK")))]
pub async fn list(State(state): State<ServerState>, ApiQuery(q): ApiQuery<ListQuery>) -> Result<Json<Vec<PackageWithItems>>, JsonApiError> {
    Ok(Json(package_service::list_packages(&state.db, q.status).await?))
}

#[utoipa::path(post, path = "/packages", tag = "packages", request_body = crate::openapi::PackageRequest, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error")))]
pub async fn create(State(state): State<ServerState>, ApiJson(input): ApiJson<PackageInput>) -> Result<(StatusCode, Json<PackageWithItems>), JsonApiError> {
    let created = package_service::create_package(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/packages/{id}", tag = "packages", params(("id" = Uuid, Path, description = "Package ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<PackageWithItems>, JsonApiError> {
    package_service::get_package(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found("package"))
}

#[utoipa::path(put, path = "/packages/{id}", tag = "packages", params(("id" = Uuid, Path, description = "Package ID")), request_body = crate::openapi::PackageRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not Found")))]
pub async fn update(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>, ApiJson(input): ApiJson<PackageInput>) -> Result<Json<PackageWithItems>, JsonApiError> {
    Ok(Json(package_service::update_package(&state.db, id, input).await?))
}

#[utoipa::path(delete, path = "/packages/{id}", tag = "packages", params(("id" = Uuid, Path, description = "Package ID")), responses((status = 204, description = "Deleted"), (status = 409, description = "Package was sold")))]
pub async fn delete(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<StatusCode, JsonApiError> {
    package_service::delete_package(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/packages/{id}/toggle-status", tag = "packages", params(("id" = Uuid, Path, description = "Package ID")), responses((status = 200, description = "Status flipped")))]
pub async fn toggle_status(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<package::Model>, JsonApiError> {
    Ok(Json(package_service::toggle_package_status(&state.db, id).await?))
}
