//! JWT issuance and verification
//!
//! Tokens are signed with HS256 and carry the caller identity as a nested
//! `user` object: `{"user": {"id": ..., "username": ...}, "iat", "exp"}`.
//!
//! Verification never trusts the payload shape: the `user` value is decoded
//! as raw JSON and field-checked by hand, so an absent or non-string field
//! surfaces as [`AuthError::MalformedClaims`] instead of a crash.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::Claims;
use crate::types::{AgoraError, AuthError};

/// Raw token payload, before the `user` object is validated.
#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    user: serde_json::Value,
    iat: u64,
    exp: u64,
}

/// JWT validator and generator
#[derive(Clone)]
pub struct JwtValidator {
    secret: String,
    expiry_seconds: u64,
}

impl JwtValidator {
    /// Create a new JWT validator
    ///
    /// Returns an error if the secret is empty or too short.
    pub fn new(secret: String, expiry_seconds: u64) -> Result<Self, AgoraError> {
        if secret.is_empty() {
            return Err(AgoraError::Config(
                "JWT_SECRET is required in production mode".into(),
            ));
        }

        if secret.len() < 32 {
            return Err(AgoraError::Config(
                "JWT_SECRET must be at least 32 characters".into(),
            ));
        }

        Ok(Self {
            secret,
            expiry_seconds,
        })
    }

    /// Create a validator for dev mode (fixed insecure secret)
    pub fn new_dev() -> Self {
        Self {
            secret: "dev-mode-secret-not-for-production-use-123456".into(),
            expiry_seconds: 86400,
        }
    }

    /// Issue a signed token for an authenticated user
    pub fn issue_token(&self, claims: &Claims) -> Result<String, AgoraError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AgoraError::Internal(format!("System time error: {}", e)))?
            .as_secs();

        let payload = TokenPayload {
            user: serde_json::json!({
                "id": claims.id,
                "username": claims.username,
            }),
            iat: now,
            exp: now + self.expiry_seconds,
        };

        encode(
            &Header::default(),
            &payload,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AgoraError::Internal(format!("Failed to issue token: {}", e)))
    }

    /// Verify a token and extract the caller identity.
    ///
    /// Every failure is a typed [`AuthError`]; nothing in here may panic on
    /// attacker-controlled input.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let payload = decode::<TokenPayload>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|err| {
            use jsonwebtoken::errors::ErrorKind;
            match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::Json(e) => AuthError::MalformedClaims(e.to_string()),
                _ => AuthError::InvalidSignature,
            }
        })?
        .claims;

        let user = payload
            .user
            .as_object()
            .ok_or_else(|| AuthError::MalformedClaims("user claim is not an object".into()))?;

        let id = user
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AuthError::MalformedClaims("user.id is missing or not a string".into()))?;

        let username = user.get("username").and_then(|v| v.as_str()).ok_or_else(|| {
            AuthError::MalformedClaims("user.username is missing or not a string".into())
        })?;

        Ok(Claims::new(id, username))
    }
}

/// Extract the token from an Authorization header.
///
/// Only the "Bearer <token>" form is accepted; anything else is
/// [`AuthError::MissingToken`].
pub fn bearer_token(auth_header: Option<&str>) -> Result<&str, AuthError> {
    let token = auth_header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;
    Ok(token)
}
