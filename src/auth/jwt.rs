// Bearer token verification
// Tokens are issued by the hosted backend; this service only checks them

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::UserContext;

/// Claims this service relies on
///
/// The backend adds more (role, email, ...); they are ignored.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID (subject)
    pub sub: Uuid,
    /// Expiry timestamp (seconds since epoch)
    pub exp: usize,
}

/// Signs a token for `user_id` valid for `ttl`
///
/// Used by tests and local tooling; production tokens come from the backend.
///
/// # Example
/// ```
/// use admuse_api::auth::jwt::{authenticate, create_token};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// let user_id = Uuid::new_v4();
/// let token = create_token(user_id, "secret", Duration::hours(1)).unwrap();
///
/// let user = authenticate(&token, "secret").unwrap();
/// assert_eq!(user.user_id(), user_id);
/// ```
pub fn create_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, String> {
    let claims = Claims {
        sub: user_id,
        exp: (Utc::now() + ttl).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| e.to_string())
}

/// Verifies the signature and expiry of a token
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    let mut validation = Validation::default();
    // Backend tokens carry an audience claim we do not check
    validation.validate_aud = false;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)
        .map(|data| data.claims)
        .map_err(|e| e.to_string())
}

/// Verifies a token and keeps it for calls made on the user's behalf
pub fn authenticate(token: &str, secret: &str) -> Result<UserContext, String> {
    let claims = verify_token(token, secret)?;
    Ok(UserContext::new(claims.sub, token))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-unit-tests";

    #[test]
    fn authenticate_keeps_the_raw_token() {
        let user_id = Uuid::new_v4();
        let token = create_token(user_id, TEST_SECRET, Duration::hours(1)).unwrap();

        let user = authenticate(&token, TEST_SECRET).unwrap();

        assert_eq!(user.user_id(), user_id);
        assert_eq!(user.access_token(), token);
    }

    #[test]
    fn wrong_secret_fails() {
        let token = create_token(Uuid::new_v4(), TEST_SECRET, Duration::hours(1)).unwrap();
        assert!(verify_token(&token, "wrong-secret").is_err());
    }

    #[test]
    fn expired_token_fails() {
        let token = create_token(Uuid::new_v4(), TEST_SECRET, Duration::hours(-2)).unwrap();
        assert!(verify_token(&token, TEST_SECRET).is_err());
    }

    #[test]
    fn garbage_fails() {
        assert!(verify_token("invalid.token.string", TEST_SECRET).is_err());
    }
}
