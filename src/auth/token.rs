//! Stateless bearer token issuance and verification
//!
//! Tokens are self-contained HS256 JWTs; the server keeps no session table
//! and no revocation list. Logout is client-side cookie clearing; a token for
//! a deleted account is caught at the next request by the user lookup.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::warn;

use super::models::Claims;
use crate::common::ApiError;

#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl: Duration,
}

impl TokenService {
    /// Default token lifetime, matching the 7-day auth cookie
    pub const DEFAULT_TTL_DAYS: i64 = 7;

    pub fn new(secret: String, ttl_days: i64) -> Self {
        Self {
            secret,
            ttl: Duration::days(ttl_days),
        }
    }

    /// Issue a signed token for a user. Pure function of secret + claims + clock.
    pub fn issue(&self, user_id: &str, email: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            warn!(error = %e, "JWT encoding failed");
            ApiError::InternalServer("token encoding failed".to_string())
        })
    }

    /// Verify a token and return its claims.
    ///
    /// Expiry is a distinct failure from a bad signature or malformed token;
    /// clients re-authenticate on either but can message them differently.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // No clock leeway: an expiry even one second in the past must fail.
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => ApiError::TokenExpired,
            _ => {
                warn!(error = %e, "JWT validation failed");
                ApiError::InvalidToken
            }
        })
    }
}
