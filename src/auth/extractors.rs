//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::models::{Role, User};
use crate::billing::models::{Plan, Subscription};
use crate::common::{safe_email_log, safe_token_log, ApiError, AppState};

/// Name of the http-only auth cookie
pub const TOKEN_COOKIE: &str = "token";

/// Authenticated caller, resolved from a bearer token.
///
/// Extraction walks UNAUTHENTICATED -> AUTHENTICATED (token valid, user row
/// exists) and exposes the role/plan gates that complete the authorization
/// state machine. A valid token whose user has been deleted is a 404
/// UserNotFound, deliberately distinct from InvalidToken.
#[derive(Debug)]
pub struct AuthedUser {
    pub user: User,
    pub subscription: Option<Subscription>,
}

impl AuthedUser {
    /// Role gate: the caller's role must be in the allowed set.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.user.role) {
            Ok(())
        } else {
            warn!(
                user_id = %self.user.id,
                role = ?self.user.role,
                "Role gate rejected request"
            );
            Err(ApiError::Forbidden("Insufficient permissions".to_string()))
        }
    }

    /// Plan gate: strict ordinal comparison over the plan hierarchy.
    /// A caller with no subscription row fails the same way as an
    /// insufficient plan.
    pub fn require_plan(&self, minimum: Plan) -> Result<(), ApiError> {
        match &self.subscription {
            Some(sub) if sub.plan >= minimum => Ok(()),
            _ => {
                warn!(
                    user_id = %self.user.id,
                    current_plan = ?self.subscription.as_ref().map(|s| s.plan),
                    required_plan = ?minimum,
                    "Plan gate rejected request"
                );
                Err(ApiError::PlanRequired(minimum))
            }
        }
    }

    /// The caller's effective plan (FREE when no subscription row exists)
    pub fn plan(&self) -> Plan {
        self.subscription.as_ref().map(|s| s.plan).unwrap_or(Plan::Free)
    }
}

/// Pull the bearer token out of the request: cookie first, then the
/// Authorization header. First non-empty source wins.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(cookie_header) = headers.get(COOKIE).and_then(|h| h.to_str().ok()) {
        for pair in cookie_header.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            if parts.next() == Some(TOKEN_COOKIE) {
                if let Some(value) = parts.next() {
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.strip_prefix("Bearer ").unwrap_or(s))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let token = token_from_headers(&parts.headers).ok_or_else(|| {
            warn!("Authentication failed: no token in cookie or Authorization header");
            ApiError::AuthRequired
        })?;

        let claims = app_state.tokens.verify(&token).map_err(|e| {
            warn!(token = %safe_token_log(&token), "Token verification failed");
            e
        })?;

        let user = app_state
            .credentials
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| {
                // Token outlived the account; surface the deletion.
                warn!(user_id = %claims.sub, "Valid token for a deleted user");
                ApiError::UserNotFound
            })?;

        let subscription = app_state.ledger.for_user(&user.id).await?;

        debug!(
            user_id = %user.id,
            email = %safe_email_log(&user.email),
            role = ?user.role,
            plan = ?subscription.as_ref().map(|s| s.plan),
            "Request authenticated"
        );

        Ok(AuthedUser { user, subscription })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("token=abc123; theme=dark"));

        assert_eq!(token_from_headers(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_cookie_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("token=from-cookie"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        assert_eq!(
            token_from_headers(&headers),
            Some("from-cookie".to_string())
        );
    }

    #[test]
    fn test_bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        assert_eq!(
            token_from_headers(&headers),
            Some("from-header".to_string())
        );
    }

    #[test]
    fn test_empty_cookie_falls_through() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("token="));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        assert_eq!(
            token_from_headers(&headers),
            Some("from-header".to_string())
        );
    }

    #[test]
    fn test_no_token_anywhere() {
        let headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers), None);
    }

    #[test]
    fn test_raw_authorization_without_bearer_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("raw-token"));

        assert_eq!(token_from_headers(&headers), Some("raw-token".to_string()));
    }
}
