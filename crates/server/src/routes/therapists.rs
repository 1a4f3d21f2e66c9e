use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Deserialize;
use uuid::Uuid;

use actions::report_service::{self, TherapistPerformance};
use actions::technique_service::{self, TherapistTechnique};
use actions::user_service;
use models::enums::{TechniqueLevel, UserRole};
use models::{user, user_technique};

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::auth::ServerState;

fn default_level() -> TechniqueLevel {
    TechniqueLevel::Learning
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateTherapistRequest {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetTechniquesRequest {
    pub technique_ids: Vec<Uuid>,
    #[serde(default = "default_level")]
    #[schema(value_type = String)]
    pub level: TechniqueLevel,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct RangeQuery {
    #[param(value_type = String)]
    pub from: DateTimeWithTimeZone,
    #[param(value_type = String)]
    pub to: DateTimeWithTimeZone,
}

#[utoipa::path(get, path = "/therapists", tag = "therapists", responses((status = 200, description = "Ordered by name")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<user::Model>>, JsonApiError> {
    Ok(Json(user_service::list_therapists(&state.db).await?))
}

/// Staff record only; credentials are set through `/auth/register`.
#[utoipa::path(post, path = "/therapists", tag = "therapists", request_body = CreateTherapistRequest, responses((status = 201, description = "Created"), (status = 409, description = "Email taken")))]
pub async fn create(State(state): State<ServerState>, ApiJson(body): ApiJson<CreateTherapistRequest>) -> Result<(StatusCode, Json<user::Model>), JsonApiError> {
    let created = user_service::create_user(&state.db, &body.email, &body.name, UserRole::Therapist).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/therapists/{id}/techniques", tag = "therapists", params(("id" = Uuid, Path, description = "Therapist ID")), responses((status = 200, description = "Techniques with status")))]
pub async fn techniques(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<Vec<TherapistTechnique>>, JsonApiError> {
    Ok(Json(technique_service::list_techniques_for_therapist(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/therapists/{id}/techniques", tag = "therapists",
    params(("id" = Uuid, Path, description = "Therapist ID")),
    request_body = SetTechniquesRequest,
    responses((status = 200, description = "Technique set replaced"), (status = 404, description = "Unknown therapist or technique"))
)]
pub async fn set_techniques(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<SetTechniquesRequest>,
) -> Result<Json<Vec<user_technique::Model>>, JsonApiError> {
    Ok(Json(technique_service::assign_techniques_to_therapist(&state.db, id, body.technique_ids, body.level).await?))
}

#[utoipa::path(get, path = "/therapists/{id}/performance", tag = "therapists", params(("id" = Uuid, Path, description = "Therapist ID"), RangeQuery), responses((status = 200, description = "Appointment counts")))]
pub async fn performance(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(range): ApiQuery<RangeQuery>,
) -> Result<Json<TherapistPerformance>, JsonApiError> {
    Ok(Json(report_service::therapist_performance(&state.db, id, range.from, range.to).await?))
}
