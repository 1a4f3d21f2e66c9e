use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use actions::chart_service::{self, ChartPoint, ChartQuery};
use actions::sale_service::{self, CreateSaleInput, SaleOutcome};

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::routes::auth::ServerState;

#[utoipa::path(
    post, path = "/sales", tag = "sales",
    request_body = crate::openapi::SaleRequest,
    responses(
        (status = 201, description = "Sale recorded and balances granted"),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Inactive service or package")
    )
)]
pub async fn create(State(state): State<ServerState>, ApiJson(input): ApiJson<CreateSaleInput>) -> Result<(StatusCode, Json<SaleOutcome>), JsonApiError> {
    let out = sale_service::create_sale(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(out)))
}

#[utoipa::path(
    get, path = "/charts/sales", tag = "sales",
    params(
        ("from" = String, Query, description = "RFC 3339 lower bound"),
        ("to" = String, Query, description = "RFC 3339 upper bound"),
        ("unit" = String, Query, description = "day, week, month or year"),
        ("service_id" = Option<Uuid>, Query, description = "Only sales of this service"),
        ("mode" = Option<String>, Query, description = "sum (default) or count"),
    ),
    responses((status = 200, description = "Bucketed totals ordered by date"), (status = 400, description = "Validation Error"))
)]
pub async fn chart(State(state): State<ServerState>, ApiQuery(q): ApiQuery<ChartQuery>) -> Result<Json<Vec<ChartPoint>>, JsonApiError> {
    Ok(Json(chart_service::get_chart_data(&state.db, q).await?))
}
