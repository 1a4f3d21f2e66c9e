use std::sync::Arc;

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use models::enums::UserRole;
use models::{user, validate};

use super::domain::{AuthSession, AuthUser, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::token;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub password_algorithm: String,
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: None, password_algorithm: "argon2".into(), token_ttl_hours: 12 }
    }
}

/// Registration and login, independent of the web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Set a password for a staff email.
    ///
    /// An unknown email gets a new RECEPTIONIST account. A staff record
    /// created earlier without credentials (for example a therapist added
    /// from the desk) is claimed and keeps its role. An email that already
    /// has a password is refused.
    ///
    /// # Examples
    /// ```
    /// use actions::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use actions::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::default());
    /// let input = RegisterInput { email: "desk@clinic.test".into(), name: "Front Desk".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "desk@clinic.test");
    /// assert_eq!(user.role, "RECEPTIONIST");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        user::validate_email(&input.email).map_err(|e| AuthError::Validation(e.to_string()))?;
        user::validate_name(&input.name).map_err(|e| AuthError::Validation(e.to_string()))?;
        validate::min_len("password", &input.password, 8).map_err(|_| AuthError::Validation("password too short (>=8)".into()))?;

        let account = match self.repo.find_user_by_email(&input.email).await? {
            Some(existing) => {
                if self.repo.get_credentials(existing.id).await?.is_some() {
                    debug!(user_id = %existing.id, "account already has a password");
                    return Err(AuthError::AccountExists);
                }
                existing
            }
            None => self.repo.create_user(&input.email, &input.name, UserRole::Receptionist).await?,
        };

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?
            .to_string();

        self.repo.upsert_password(account.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %account.id, email = %account.email, role = %account.role, "user_registered");
        Ok(account)
    }

    /// Verify the password and, when a secret is configured, issue a token.
    ///
    /// # Examples
    /// ```
    /// use actions::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use actions::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let cfg = AuthConfig { jwt_secret: Some("0123456789abcdef".into()), ..AuthConfig::default() };
    /// let svc = AuthService::new(repo, cfg);
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "tom@clinic.test".into(), name: "Tom".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "tom@clinic.test".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "tom@clinic.test");
    /// assert!(session.token.is_some());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let found = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let cred = self.repo
            .get_credentials(found.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::InvalidCredentials);
        }

        let token = match &self.cfg.jwt_secret {
            Some(secret) => Some(token::issue(&found, secret, self.cfg.token_ttl_hours)?),
            None => None,
        };
        info!(user_id = %found.id, "user_logged_in");
        Ok(AuthSession { user: found, token })
    }
}
