//! User profile handlers

use axum::{
    extract::{Extension, Json},
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::extractors::{AuthedUser, TOKEN_COOKIE};
use crate::common::{ApiError, AppState, ValidationResult};

#[derive(Deserialize, Debug)]
pub struct UpdateProfilePayload {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// GET /api/user/profile
/// Full profile view: identity, subscription and usage counters.
pub async fn profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let ai_chats: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ai_chats WHERE user_id = ?")
        .bind(&authed.user.id)
        .fetch_one(&state.db)
        .await?;
    let contacts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts WHERE user_id = ?")
        .bind(&authed.user.id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "user": {
            "id": authed.user.id,
            "email": authed.user.email,
            "name": authed.user.name,
            "avatar": authed.user.avatar,
            "role": authed.user.role,
            "subscription": authed.subscription,
            "stats": {
                "aiChats": ai_chats,
                "contacts": contacts,
            },
            "createdAt": authed.user.created_at,
        },
    })))
}

/// PUT /api/user/profile
/// Updates name and avatar; omitted fields keep their current values.
pub async fn update_profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if let Some(name) = &payload.name {
        let mut validation = ValidationResult::new();
        validation.check_not_empty("name", name);
        if !validation.is_valid {
            return Err(validation.into());
        }
    }

    let user = state
        .credentials
        .update_profile(
            &authed.user.id,
            payload.name.as_deref().map(str::trim),
            payload.avatar.as_deref(),
        )
        .await?;

    info!(user_id = %user.id, "Profile updated");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Profile updated successfully",
        "user": {
            "id": user.id,
            "email": user.email,
            "name": user.name,
            "avatar": user.avatar,
            "role": user.role,
            "subscription": authed.subscription,
        },
    })))
}

/// DELETE /api/user/account
/// Removes the account and everything hanging off it (subscriptions,
/// payments, chats cascade), then clears the cookie.
pub async fn delete_account(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    state.credentials.delete_account(&authed.user.id).await?;

    info!(user_id = %authed.user.id, "Account deleted");

    let mut cookie = format!("{}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax", TOKEN_COOKIE);
    if state.production {
        cookie.push_str("; Secure");
    }

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(serde_json::json!({
            "success": true,
            "message": "Account deleted successfully",
        })),
    ))
}
