use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

mod support;
use support::{build_app, login_token, send};

#[tokio::test]
async fn test_register_and_login_flow() -> anyhow::Result<()> {
    let app = build_app().await?;

    let (status, body) = send(&app, "POST", "/auth/register", None, Some(json!({"email": "ana@clinic.test", "name": "Ana", "password": "S3curePass!", "role": "THERAPIST"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["user_id"].is_string());

    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"email": "ANA@clinic.test", "password": "S3curePass!"}))?))?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp.headers().get(header::SET_COOKIE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    assert!(cookie.starts_with("auth_token="), "cookie: {cookie}");

    // a role in the registration body is ignored
    let (_, login) = send(&app, "POST", "/auth/login", None, Some(json!({"email": "ana@clinic.test", "password": "S3curePass!"}))).await?;
    assert_eq!(login["role"], "RECEPTIONIST");
    Ok(())
}

#[tokio::test]
async fn test_therapist_added_by_staff_claims_account() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = login_token(&app).await?;
    let (status, therapist) = send(&app, "POST", "/therapists", Some(&token), Some(json!({"email": "rosa@clinic.test", "name": "Rosa"}))).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/auth/register", None, Some(json!({"email": "rosa@clinic.test", "name": "Rosa", "password": "Th3rapist!"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], therapist["id"]);

    let (status, login) = send(&app, "POST", "/auth/login", None, Some(json!({"email": "rosa@clinic.test", "password": "Th3rapist!"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["role"], "THERAPIST");

    let (status, _) = send(&app, "POST", "/auth/register", None, Some(json!({"email": "rosa@clinic.test", "name": "Rosa", "password": "0therPass!"}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn test_malformed_register_body_is_a_json_error() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (status, body) = send(&app, "POST", "/auth/register", None, Some(json!({"email": "x@clinic.test"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");
    assert!(body["detail"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_conflicts() -> anyhow::Result<()> {
    let app = build_app().await?;
    let body = json!({"email": "tom@clinic.test", "name": "Tom", "password": "Passw0rd!"});
    let (first, _) = send(&app, "POST", "/auth/register", None, Some(body.clone())).await?;
    assert_eq!(first, StatusCode::OK);
    let (second, err) = send(&app, "POST", "/auth/register", None, Some(body)).await?;
    assert_eq!(second, StatusCode::CONFLICT);
    assert!(err["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_login_wrong_password() -> anyhow::Result<()> {
    let app = build_app().await?;
    send(&app, "POST", "/auth/register", None, Some(json!({"email": "eva@clinic.test", "name": "Eva", "password": "StrongPass123"}))).await?;
    let (status, _) = send(&app, "POST", "/auth/login", None, Some(json!({"email": "eva@clinic.test", "password": "wrong-pass"}))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_register_short_password_rejected() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (status, body) = send(&app, "POST", "/auth/register", None, Some(json!({"email": "a@b.com", "name": "Al", "password": "short"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "validation failed: password too short (>=8)");
    Ok(())
}

#[tokio::test]
async fn test_protected_routes_need_a_valid_token() -> anyhow::Result<()> {
    let app = build_app().await?;

    let (missing, _) = send(&app, "GET", "/patients", None, None).await?;
    assert_eq!(missing, StatusCode::BAD_REQUEST);

    let (invalid, _) = send(&app, "GET", "/patients", Some("not-a-jwt"), None).await?;
    assert_eq!(invalid, StatusCode::UNAUTHORIZED);

    let token = login_token(&app).await?;
    let (status, me) = send(&app, "GET", "/auth/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "desk@clinic.test");
    assert_eq!(me["role"], "RECEPTIONIST");
    Ok(())
}

#[tokio::test]
async fn test_cookie_is_accepted_in_place_of_bearer() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = login_token(&app).await?;
    let req = Request::builder()
        .uri("/therapists")
        .header(header::COOKIE, format!("auth_token={token}"))
        .body(Body::empty())?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_health_and_docs_are_public() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (status, body) = send(&app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let (status, doc) = send(&app, "GET", "/api-docs/openapi.json", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/appointments/{id}/complete"].is_object());
    Ok(())
}
