//! Signed single-purpose account tokens.
//!
//! Confirmation links, password resets and email changes all ride on the
//! same HS256 token: user id, operation tag, expiry, and for email changes
//! the new address. Verification fails closed: any signature, expiry or
//! operation mismatch yields `None` rather than an error the caller might
//! leak to the client.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default token lifetime in seconds.
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// The HS256 signing secret, held as actix app data so handlers receive it
/// explicitly instead of reaching for the environment.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// What a token authorizes. A token minted for one operation is never
/// accepted for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "confirm")]
    Confirm,
    #[serde(rename = "reset-password")]
    ResetPassword,
    #[serde(rename = "change-email")]
    ChangeEmail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub operation: Operation,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_email: Option<String>,
}

/// Mint a token for `user_id` valid for `ttl_secs` from now.
pub fn generate(
    secret: &[u8],
    user_id: i32,
    operation: Operation,
    new_email: Option<String>,
    ttl_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        id: user_id,
        operation,
        exp: chrono::Utc::now().timestamp() + ttl_secs,
        new_email,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

/// Verify a token and check it was minted for `expected`. Returns the
/// claims only when the signature is valid, the token has not expired
/// (no leeway) and the operation matches.
pub fn verify(secret: &[u8], token: &str, expected: Operation) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation).ok()?;
    if data.claims.operation != expected {
        return None;
    }
    Some(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"unit-test-signing-key";

    #[test]
    fn round_trip_each_operation() {
        for op in [Operation::Confirm, Operation::ResetPassword, Operation::ChangeEmail] {
            let token = generate(KEY, 42, op, None, DEFAULT_TTL_SECS).unwrap();
            let claims = verify(KEY, &token, op).expect("fresh token should verify");
            assert_eq!(claims.id, 42);
            assert_eq!(claims.operation, op);
            assert_eq!(claims.new_email, None);
        }
    }

    #[test]
    fn carries_new_email_for_change() {
        let token = generate(
            KEY,
            7,
            Operation::ChangeEmail,
            Some("new@example.com".to_owned()),
            DEFAULT_TTL_SECS,
        )
        .unwrap();
        let claims = verify(KEY, &token, Operation::ChangeEmail).unwrap();
        assert_eq!(claims.new_email.as_deref(), Some("new@example.com"));
    }

    #[test]
    fn rejects_wrong_operation() {
        let token = generate(KEY, 1, Operation::Confirm, None, DEFAULT_TTL_SECS).unwrap();
        assert!(verify(KEY, &token, Operation::ResetPassword).is_none());
        assert!(verify(KEY, &token, Operation::ChangeEmail).is_none());
    }

    #[test]
    fn rejects_wrong_key() {
        let token = generate(KEY, 1, Operation::Confirm, None, DEFAULT_TTL_SECS).unwrap();
        assert!(verify(b"some-other-key", &token, Operation::Confirm).is_none());
    }

    #[test]
    fn rejects_expired_token() {
        let token = generate(KEY, 1, Operation::Confirm, None, -10).unwrap();
        assert!(verify(KEY, &token, Operation::Confirm).is_none());
    }

    #[test]
    fn rejects_garbage() {
        assert!(verify(KEY, "not-a-token", Operation::Confirm).is_none());
        assert!(verify(KEY, "", Operation::Confirm).is_none());
    }
}
