//! HS256 session tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::AuthUser;
use super::errors::AuthError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Email of the staff member.
    pub sub: String,
    pub uid: Uuid,
    pub role: String,
    pub exp: usize,
}

pub fn issue(user: &AuthUser, secret: &str, ttl_hours: i64) -> Result<String, AuthError> {
    let exp = (Utc::now() + Duration::hours(ttl_hours)).timestamp() as usize;
    let claims = Claims { sub: user.email.clone(), uid: user.id, role: user.role.clone(), exp };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::Token(e.to_string()))
}

/// Check signature and expiry.
pub fn verify(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::Token(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthUser {
        AuthUser { id: Uuid::new_v4(), email: "tom@clinic.test".into(), name: "Tom".into(), role: "THERAPIST".into() }
    }

    #[test]
    fn issued_token_verifies_with_same_secret_only() {
        let u = user();
        let token = issue(&u, "0123456789abcdef", 1).unwrap();
        let claims = verify(&token, "0123456789abcdef").unwrap();
        assert_eq!(claims.uid, u.id);
        assert_eq!(claims.role, "THERAPIST");
        assert!(verify(&token, "another-secret-value").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue(&user(), "0123456789abcdef", -2).unwrap();
        assert!(matches!(verify(&token, "0123456789abcdef"), Err(AuthError::Token(_))));
    }
}
