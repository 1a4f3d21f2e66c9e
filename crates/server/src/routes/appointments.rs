use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use actions::appointment_service::{
    self, AppointmentDetail, AppointmentFilter, Completion, CreateAppointmentInput, UpdateAppointmentInput,
};
use models::appointment;
use models::enums::Evaluation;

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CompleteRequest {
    pub patient_id: Uuid,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct EvaluationRequest {
    /// `APPROVED` or `REJECTED`.
    #[schema(value_type = String)]
    pub evaluation: Evaluation,
}

#[utoipa::path(
    get, path = "/appointments", tag = "appointments",
    params(
        ("from" = Option<String>, Query, description = "RFC 3339 lower bound"),
        ("to" = Option<String>, Query, description = "RFC 3339 upper bound"),
        ("patient_id" = Option<Uuid>, Query, description = "Only appointments of this patient"),
        ("therapist_id" = Option<Uuid>, Query, description = "Only appointments of this therapist"),
        ("status" = Option<String>, Query, description = "PROGRAMMED or DONE"),
    ),
    responses((status = 200, description = "Ordered by date"), (status = 400, description = "Validation Error"))
)]
pub async fn list(State(state): State<ServerState>, ApiQuery(filter): ApiQuery<AppointmentFilter>) -> Result<Json<Vec<AppointmentDetail>>, JsonApiError> {
    Ok(Json(appointment_service::list_appointments(&state.db, filter).await?))
}

#[utoipa::path(
    post, path = "/appointments", tag = "appointments",
    request_body = crate::openapi::AppointmentRequest,
    responses(
        (status = 201, description = "Booked"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Unknown service or patient"),
        (status = 409, description = "Inactive service or non-therapist user")
    )
)]
pub async fn create(State(state): State<ServerState>, ApiJson(input): ApiJson<CreateAppointmentInput>) -> Result<(StatusCode, Json<AppointmentDetail>), JsonApiError> {
    let created = appointment_service::create_appointment(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/appointments/{id}", tag = "appointments", params(("id" = Uuid, Path, description = "Appointment ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<Json<AppointmentDetail>, JsonApiError> {
    appointment_service::get_appointment(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found("appointment"))
}

#[utoipa::path(put, path = "/appointments/{id}", tag = "appointments", params(("id" = Uuid, Path, description = "Appointment ID")), request_body = crate::openapi::AppointmentUpdateRequest, responses((status = 200, description = "Updated"), (status = 409, description = "Already completed")))]
pub async fn update(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>, ApiJson(input): ApiJson<UpdateAppointmentInput>) -> Result<Json<appointment::Model>, JsonApiError> {
    Ok(Json(appointment_service::update_appointment(&state.db, id, input).await?))
}

#[utoipa::path(delete, path = "/appointments/{id}", tag = "appointments", params(("id" = Uuid, Path, description = "Appointment ID")), responses((status = 204, description = "Cancelled"), (status = 409, description = "Already completed")))]
pub async fn delete(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> Result<StatusCode, JsonApiError> {
    appointment_service::delete_appointment(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post, path = "/appointments/{id}/complete", tag = "appointments",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = CompleteRequest,
    responses(
        (status = 200, description = "Completed, one session consumed"),
        (status = 409, description = "Already completed or no available balance")
    )
)]
pub async fn complete(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>, ApiJson(body): ApiJson<CompleteRequest>) -> Result<Json<Completion>, JsonApiError> {
    Ok(Json(appointment_service::complete_appointment(&state.db, id, body.patient_id).await?))
}

#[utoipa::path(
    put, path = "/appointments/{id}/evaluation", tag = "appointments",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = EvaluationRequest,
    responses((status = 200, description = "Evaluated"), (status = 400, description = "Validation Error"), (status = 409, description = "Not completed"))
)]
pub async fn evaluate(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>, ApiJson(body): ApiJson<EvaluationRequest>) -> Result<Json<appointment::Model>, JsonApiError> {
    Ok(Json(appointment_service::evaluate_appointment(&state.db, id, body.evaluation).await?))
}
