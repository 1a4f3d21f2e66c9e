use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;

pub mod appointments;
pub mod auth;
pub mod packages;
pub mod patients;
pub mod sales;
pub mod services;
pub mod techniques;
pub mod therapists;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

fn practice_routes() -> Router<auth::ServerState> {
    Router::new()
        .route("/patients", get(patients::list).post(patients::create))
        .route("/patients/:id", get(patients::get).put(patients::update).delete(patients::delete))
        .route("/patients/:id/balances", get(patients::balances))
        .route("/patients/:id/sales", get(patients::sales))
        .route("/techniques", get(techniques::list).post(techniques::create))
        .route("/techniques/:id", get(techniques::get).put(techniques::update).delete(techniques::delete))
        .route("/techniques/:id/therapists", get(techniques::therapists).post(techniques::assign_therapists))
        .route("/therapists", get(therapists::list).post(therapists::create))
        .route("/therapists/:id/techniques", get(therapists::techniques).put(therapists::set_techniques))
        .route("/therapists/:id/performance", get(therapists::performance))
        .route("/services", get(services::list).post(services::create))
        .route("/services/active", get(services::list_active))
        .route("/services/:id", get(services::get).put(services::update).delete(services::delete))
        .route("/services/:id/toggle-status", post(services::toggle_status))
        .route("/packages", get(packages::list).post(packages::create))
        .route("/packages/:id", get(packages::get).put(packages::update).delete(packages::delete))
        .route("/packages/:id/toggle-status", post(packages::toggle_status))
        .route("/appointments", get(appointments::list).post(appointments::create))
        .route("/appointments/:id", get(appointments::get).put(appointments::update).delete(appointments::delete))
        .route("/appointments/:id/complete", post(appointments::complete))
        .route("/appointments/:id/evaluation", put(appointments::evaluate))
        .route("/sales", post(sales::create))
        .route("/charts/sales", get(sales::chart))
}

/// Build the full application router: public health/auth/docs routes plus
/// the practice API behind the bearer-token middleware.
pub fn build_router(state: auth::ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    let protected = practice_routes()
        .route("/auth/me", get(auth::me))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token_state));

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public)
        .merge(protected)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status code and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
