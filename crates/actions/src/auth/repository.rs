use async_trait::async_trait;
use uuid::Uuid;

use models::enums::UserRole;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Persistence needed by [`super::AuthService`].
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(&self, email: &str, name: &str, role: UserRole) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError>;
}

/// In-memory repository for tests, doc examples and benches
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>, // key: lower-cased email
        creds: Mutex<HashMap<Uuid, Credentials>>,
    }

    fn key(email: &str) -> String {
        email.trim().to_ascii_lowercase()
    }

    fn poisoned<T>(_: T) -> AuthError {
        AuthError::Repository("mock store poisoned".into())
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().map_err(poisoned)?;
            Ok(users.get(&key(email)).cloned())
        }

        async fn create_user(&self, email: &str, name: &str, role: UserRole) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().map_err(poisoned)?;
            if users.contains_key(&key(email)) {
                return Err(AuthError::AccountExists);
            }
            let user = AuthUser { id: Uuid::new_v4(), email: key(email), name: name.to_string(), role: role.as_str().to_string() };
            users.insert(key(email), user.clone());
            Ok(user)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().map_err(poisoned)?;
            Ok(creds.get(&user_id).cloned())
        }

        async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
            let mut creds = self.creds.lock().map_err(poisoned)?;
            let c = Credentials { user_id, password_hash, password_algorithm };
            creds.insert(user_id, c.clone());
            Ok(c)
        }
    }
}
