#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database};
use serde_json::Value;
use tower::ServiceExt;

use server::routes::{self, auth};

pub const SECRET: &str = "integration-secret-0123456789";

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

/// Router over a private, migrated in-memory SQLite database.
pub async fn build_app() -> anyhow::Result<Router> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await?;
    migration::Migrator::up(&db, None).await?;
    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig { jwt_secret: SECRET.into(), token_ttl_hours: 1 },
    };
    Ok(routes::build_router(state, cors()))
}

pub async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(v) => req.header(header::CONTENT_TYPE, "application/json").body(Body::from(serde_json::to_vec(&v)?))?,
        None => req.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = resp.into_body().collect().await?.to_bytes();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, json))
}

/// Register a receptionist and return a bearer token for it.
pub async fn login_token(app: &Router) -> anyhow::Result<String> {
    let creds = serde_json::json!({"email": "desk@clinic.test", "name": "Front Desk", "password": "Secret123"});
    let (status, _) = send(app, "POST", "/auth/register", None, Some(creds)).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(app, "POST", "/auth/login", None, Some(serde_json::json!({"email": "desk@clinic.test", "password": "Secret123"}))).await?;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().map(str::to_string).ok_or_else(|| anyhow::anyhow!("login returned no token"))
}
