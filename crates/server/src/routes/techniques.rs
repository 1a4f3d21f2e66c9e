use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use actions::technique_service::{self, TechniqueInput};
use models::enums::TechniqueLevel;
use models::{technique, user};

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::routes::auth::ServerState;

fn default_level() -> TechniqueLevel {
    TechniqueLevel::Learning
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AssignTherapistsRequest {
    pub user_ids: Vec<Uuid>,
    /// `LEARNING` (default) or `CERTIFIED`.
    #[serde(default = "default_level")]
    #[schema(value_type = String)]
    pub level: TechniqueLevel,
}

#[derive(Debug, Serialize)]
pub struct AssignTherapistsOutput {
    pub inserted: u64,
}

#[utoipa::path(get, path = "/techniques", tag = "techniques", responses((status = 200, description = "Ordered by name")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<technique::Model>>, JsonApiError> {
    Ok(Json(technique_service::list_techniques(&state.db).await?))
}

#[utoipa::path(post, path = "/techniques", tag = "techniques", request_body = crate::openapi::TechniqueRequest, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error")))]
pub async fn create(State(state): State<ServerState>, ApiJson(input): ApiJson<TechniqueInput>) -> Result<(StatusCode, Json<technique::Model>), JsonApiError> {
    let created = technique_service::create_technique(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/techniques/{id}", tag = "techniques", params(("id" = Uuid, Path, description = "Technique ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<technique::Model>, JsonApiError> {
    technique_service::get_technique(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found("technique"))
}

#[utoipa::path(put, path = "/techniques/{id}", tag = "techniques", params(("id" = Uuid, Path, description = "Technique ID")), request_body = crate::openapi::TechniqueRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not Found")))]
pub async fn update(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>, ApiJson(input): ApiJson<TechniqueInput>) -> Result<Json<technique::Model>, JsonApiError> {
    Ok(Json(technique_service::update_technique(&state.db, id, input).await?))
}

#[utoipa::path(delete, path = "/techniques/{id}", tag = "techniques", params(("id" = Uuid, Path, description = "Technique ID")), responses((status = 204, description = "Deleted"), (status = 409, description = "Used by a service")))]
pub async fn delete(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<StatusCode, JsonApiError> {
    technique_service::delete_technique(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/techniques/{id}/therapists", tag = "techniques", params(("id" = Uuid, Path, description = "Technique ID")), responses((status = 200, description = "Therapists practicing the technique")))]
pub async fn therapists(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<Vec<user::Model>>, JsonApiError> {
    Ok(Json(technique_service::list_therapists_for_technique(&state.db, id).await?))
}

#[utoipa::path(
    post, path = "/techniques/{id}/therapists", tag = "techniques",
    params(("id" = Uuid, Path, description = "Technique ID")),
    request_body = AssignTherapistsRequest,
    responses((status = 200, description = "Number of new links"), (status = 409, description = "User is not a therapist"))
)]
pub async fn assign_therapists(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<AssignTherapistsRequest>,
) -> Result<Json<AssignTherapistsOutput>, JsonApiError> {
    let inserted = technique_service::assign_therapists_to_technique(&state.db, id, body.user_ids, body.level).await?;
    Ok(Json(AssignTherapistsOutput { inserted }))
}
