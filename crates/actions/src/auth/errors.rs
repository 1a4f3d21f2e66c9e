use thiserror::Error;

/// Failures of staff registration and login.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    /// The staff account already has a password.
    #[error("account already registered")]
    AccountExists,
    /// Unknown email, wrong password, or an account without a password yet.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error("token error: {0}")]
    Token(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Whether the caller, not the server, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AuthError::Validation(_) | AuthError::AccountExists | AuthError::InvalidCredentials)
    }
}
