use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use actions::auth::errors::AuthError;
use actions::ActionError;

/// JSON error body: `{"error": title, "detail": message}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: String,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &str, detail: Option<String>) -> Self {
        Self { status, title: title.to_string(), detail }
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("{what} not found")))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, title = %self.title, "request failed");
        }
        let body = serde_json::json!({ "error": self.title, "detail": self.detail });
        (self.status, Json(body)).into_response()
    }
}

impl JsonApiError {
    /// 500 with a fixed detail; the underlying cause only goes to the log.
    fn internal(title: &str, cause: &dyn std::fmt::Display) -> Self {
        error!(err = %cause, title, "internal failure");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, title, Some(INTERNAL_DETAIL.to_string()))
    }
}

const INTERNAL_DETAIL: &str = "internal server error";

impl From<ActionError> for JsonApiError {
    fn from(e: ActionError) -> Self {
        if e.is_validation() {
            return Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.to_string()));
        }
        match e {
            ActionError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Not Found", Some(e.to_string())),
            ActionError::Rule(_) => Self::new(StatusCode::CONFLICT, "Rule Violation", Some(e.to_string())),
            _ => Self::internal("Internal Error", &e),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        if !e.is_client_error() {
            return Self::internal("Auth Failed", &e);
        }
        let detail = Some(e.to_string());
        match e {
            AuthError::AccountExists => Self::new(StatusCode::CONFLICT, "Conflict", detail),
            AuthError::InvalidCredentials => Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", detail),
            _ => Self::new(StatusCode::BAD_REQUEST, "Validation Error", detail),
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
