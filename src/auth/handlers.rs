//! Authentication handlers

use axum::{
    extract::{Extension, Json, Query},
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect},
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::extractors::{AuthedUser, TOKEN_COOKIE};
use super::models::{LoginPayload, RegisterPayload, User};
use super::store::{Authenticator, LocalCredentials};
use crate::billing::models::Subscription;
use crate::common::{safe_email_log, ApiError, AppState, ValidationResult};

/// Auth cookie lifetime in seconds (7 days, matching the token TTL)
const COOKIE_MAX_AGE: i64 = 7 * 24 * 60 * 60;

fn auth_cookie(token: &str, production: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        TOKEN_COOKIE, token, COOKIE_MAX_AGE
    );
    if production {
        cookie.push_str("; Secure");
    }
    cookie
}

fn clear_cookie(production: bool) -> String {
    let mut cookie = format!(
        "{}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax",
        TOKEN_COOKIE
    );
    if production {
        cookie.push_str("; Secure");
    }
    cookie
}

fn user_json(user: &User, subscription: Option<&Subscription>) -> serde_json::Value {
    serde_json::json!({
        "id": user.id,
        "email": user.email,
        "name": user.name,
        "avatar": user.avatar,
        "role": user.role,
        "subscription": subscription,
    })
}

/// POST /api/auth/register
/// Creates a local account (with its default FREE subscription), issues a
/// token and sets the auth cookie.
pub async fn register(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let mut validation = ValidationResult::new();
    validation.check_email("email", &payload.email);
    validation.check_min_length("password", &payload.password, 8);
    validation.check_not_empty("name", &payload.name);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let email = payload.email.trim().to_lowercase();
    let user = state
        .credentials
        .create_local(&email, &payload.password, payload.name.trim())
        .await?;

    let subscription = state.ledger.for_user(&user.id).await?;
    let token = state.tokens.issue(&user.id, &user.email)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User registered"
    );

    let body = serde_json::json!({
        "success": true,
        "message": "User registered successfully",
        "user": user_json(&user, subscription.as_ref()),
        "token": token,
    });

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(SET_COOKIE, auth_cookie(&token, state.production))]),
        Json(body),
    ))
}

/// POST /api/auth/login
/// Verifies local credentials and issues a token. A federated-only account
/// gets a distinct NO_PASSWORD_SET failure so the client can suggest social
/// login.
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let mut validation = ValidationResult::new();
    validation.check_email("email", &payload.email);
    validation.check_not_empty("password", &payload.password);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let credentials = LocalCredentials {
        email: payload.email.trim().to_lowercase(),
        password: payload.password,
    };
    let user = credentials.authenticate(&state.credentials).await?;

    let subscription = state.ledger.for_user(&user.id).await?;
    let token = state.tokens.issue(&user.id, &user.email)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "Login successful"
    );

    let body = serde_json::json!({
        "success": true,
        "message": "Login successful",
        "user": user_json(&user, subscription.as_ref()),
        "token": token,
    });

    Ok((
        AppendHeaders([(SET_COOKIE, auth_cookie(&token, state.production))]),
        Json(body),
    ))
}

/// GET /api/auth/google
/// Redirects to the Google consent screen
pub async fn google_start(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();

    let auth_url = state.google.authorization_url().map_err(|e| {
        error!(error = %e, "Failed to build Google OAuth URL");
        ApiError::InternalServer("google oauth is not configured".to_string())
    })?;

    Ok(Redirect::to(&auth_url))
}

/// GET /api/auth/google/callback
/// Exchanges the authorization code for the user's profile, finds or creates
/// the account, then redirects back to the app with a fresh token.
pub async fn google_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    if let Some(oauth_error) = params.get("error") {
        warn!(oauth_error = %oauth_error, "Google OAuth returned an error");
        let url = format!("{}/login?error=oauth_failed", state.app_url);
        return Ok((
            AppendHeaders([(SET_COOKIE, clear_cookie(state.production))]),
            Redirect::to(&url),
        ));
    }

    let code = params
        .get("code")
        .ok_or_else(|| ApiError::BadRequest("No authorization code provided".to_string()))?;

    let profile = state.google.exchange_code(code).await.map_err(|e| {
        error!(error = %e, "Google code exchange failed");
        ApiError::InternalServer("google login failed".to_string())
    })?;

    let user = profile.authenticate(&state.credentials).await?;
    let token = state.tokens.issue(&user.id, &user.email)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        provider = "google",
        "Federated login successful"
    );

    let url = format!("{}?token={}", state.app_url, token);
    Ok((
        AppendHeaders([(SET_COOKIE, auth_cookie(&token, state.production))]),
        Redirect::to(&url),
    ))
}

/// POST /api/auth/logout
/// Tokens are stateless, so logout clears the cookie and nothing else.
pub async fn logout(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let body = serde_json::json!({
        "success": true,
        "message": "Logged out successfully",
    });

    Ok((
        AppendHeaders([(SET_COOKIE, clear_cookie(state.production))]),
        Json(body),
    ))
}

/// GET /api/auth/verify
/// Returns the caller's identity and subscription if the token is valid.
/// 401/404 taxonomy is handled by the AuthedUser extractor.
pub async fn verify(authed: AuthedUser) -> Result<Json<serde_json::Value>, ApiError> {
    let body = serde_json::json!({
        "success": true,
        "user": user_json(&authed.user, authed.subscription.as_ref()),
    });
    Ok(Json(body))
}
