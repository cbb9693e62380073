//! Admin token issuing and verification

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only principal the site knows about
pub const ADMIN_USER_ID: i32 = 1;

/// Role carried by admin tokens
pub const ADMIN_ROLE: &str = "admin";

/// Token handling errors
#[derive(Error, Debug)]
pub enum JwtError {
    /// Signing failed
    #[error("Token creation failed: {0}")]
    Creation(String),
    /// Signature, format or expiry check failed
    #[error("Token validation failed: {0}")]
    Validation(String),
    /// A valid token for something other than the admin role
    #[error("Token does not grant admin access")]
    Forbidden,
}

/// Claims of an admin session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Principal id, always [`ADMIN_USER_ID`]
    pub user_id: i32,
    /// Principal role, always [`ADMIN_ROLE`]
    pub role: String,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// HS256 signer and verifier for admin tokens
#[derive(Clone)]
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Create a service signing with `secret`; tokens live for `ttl_hours`
    #[must_use]
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue an admin token valid from `now`
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue(&self, now: DateTime<Utc>) -> Result<String, JwtError> {
        let claims = Claims {
            user_id: ADMIN_USER_ID,
            role: ADMIN_ROLE.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| JwtError::Creation(e.to_string()))
    }

    /// Verify signature and expiry and require the admin role
    ///
    /// # Errors
    ///
    /// Returns an error for malformed, tampered, expired or non-admin tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| JwtError::Validation(e.to_string()))?;

        if claims.role != ADMIN_ROLE {
            return Err(JwtError::Forbidden);
        }
        Ok(claims)
    }
}

/// Pull the token out of an `Authorization` header value
///
/// Accepts `Bearer <token>` as well as the bare token.
#[must_use]
pub fn token_from_header(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}
