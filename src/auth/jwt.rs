use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::role::Role;
use crate::models::Claims;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or(0)
}

/// Claims for a brand new session.
pub fn new_session_claims(
    user_id: i64,
    username: String,
    role: Role,
    intern_id: Option<i64>,
    ttl: usize,
) -> Claims {
    Claims {
        user_id,
        sub: username,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        intern_id,
    }
}

/// Same session, expiry pushed to `ttl` seconds from now.
pub fn touch(claims: &Claims, ttl: usize) -> Claims {
    Claims {
        exp: now() + ttl,
        ..claims.clone()
    }
}

pub fn encode_session(claims: &Claims, secret: &str) -> Result<String, Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-0123456789";

    #[test]
    fn token_carries_identity() {
        let claims = new_session_claims(7, "M001".into(), Role::User, Some(3), 600);
        let token = encode_session(&claims, SECRET).unwrap();
        let back = verify_token(&token, SECRET).unwrap();
        assert_eq!(back.user_id, 7);
        assert_eq!(back.role, Role::User);
        assert_eq!(back.intern_id, Some(3));
        assert_eq!(back.jti, claims.jti);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = new_session_claims(1, "admin".into(), Role::Admin, None, 600);
        let token = encode_session(&claims, SECRET).unwrap();
        assert!(verify_token(&token, "another-secret-987654").is_err());
    }

    #[test]
    fn expired_session_is_rejected() {
        let mut claims = new_session_claims(1, "admin".into(), Role::Admin, None, 600);
        claims.exp = now() - 5;
        let token = encode_session(&claims, SECRET).unwrap();
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn touch_keeps_session_id() {
        let claims = new_session_claims(1, "admin".into(), Role::Admin, None, 1);
        let later = touch(&claims, 600);
        assert_eq!(later.jti, claims.jti);
        assert!(later.exp > claims.exp);
    }
}
