use sea_orm::DatabaseConnection;
use uuid::Uuid;

use models::enums::UserRole;
use models::errors::ModelError;
use models::{user, user_credentials};

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn to_auth_user(u: user::Model) -> AuthUser {
    AuthUser { id: u.id, email: u.email, name: u.name, role: u.role }
}

fn repo_err(e: ModelError) -> AuthError {
    match e {
        ModelError::Validation(msg) => AuthError::Validation(msg),
        ModelError::Db(msg) => AuthError::Repository(msg),
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let found = user::find_by_email(&self.db, email).await.map_err(repo_err)?;
        Ok(found.map(to_auth_user))
    }

    async fn create_user(&self, email: &str, name: &str, role: UserRole) -> Result<AuthUser, AuthError> {
        let created = user::create(&self.db, email, name, role).await.map_err(repo_err)?;
        Ok(to_auth_user(created))
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let found = user_credentials::find_for_user(&self.db, user_id).await.map_err(repo_err)?;
        Ok(found.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }

    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let c = user_credentials::upsert_password(&self.db, user_id, password_hash, &password_algorithm)
            .await
            .map_err(repo_err)?;
        Ok(Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::domain::{LoginInput, RegisterInput};
    use crate::auth::service::{AuthConfig, AuthService};
    use crate::test_support::get_db;

    #[tokio::test]
    async fn register_then_login_against_database() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let repo = Arc::new(SeaOrmAuthRepository { db: db.clone() });
        let svc = AuthService::new(repo, AuthConfig { jwt_secret: Some("0123456789abcdef".into()), ..AuthConfig::default() });

        let created = svc
            .register(RegisterInput { email: "ana@clinic.test".into(), name: "Ana".into(), password: "Passw0rd!".into() })
            .await?;
        let session = svc.login(LoginInput { email: "ANA@clinic.test".into(), password: "Passw0rd!".into() }).await?;
        assert_eq!(session.user.id, created.id);
        assert_eq!(session.user.role, "RECEPTIONIST");

        let stored = user_credentials::find_for_user(&db, created.id).await?.unwrap();
        assert!(stored.password_hash.starts_with("$argon2"));
        Ok(())
    }

    #[tokio::test]
    async fn therapist_added_by_staff_can_set_a_password() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let tom = crate::user_service::create_user(&db, "tom@clinic.test", "Tom", UserRole::Therapist).await?;
        let svc = AuthService::new(
            Arc::new(SeaOrmAuthRepository { db: db.clone() }),
            AuthConfig { jwt_secret: Some("0123456789abcdef".into()), ..AuthConfig::default() },
        );

        let claimed = svc
            .register(RegisterInput { email: "tom@clinic.test".into(), name: "Tom".into(), password: "Passw0rd!".into() })
            .await?;
        assert_eq!(claimed.id, tom.id);
        let session = svc.login(LoginInput { email: "tom@clinic.test".into(), password: "Passw0rd!".into() }).await?;
        assert_eq!(session.user.role, "THERAPIST");
        Ok(())
    }
}
