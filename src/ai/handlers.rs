//! AI chat handlers: plan-limited chat proxy, history, image generation

use axum::extract::{Extension, Json, Path, Query};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::models::{AiChat, ChatPayload, GenerateImagePayload, HistoryQuery};
use crate::auth::extractors::AuthedUser;
use crate::billing::models::Plan;
use crate::common::{generate_chat_id, ApiError, AppState};
use crate::services::openrouter::OpenRouterError;

/// Chats the caller has used since local midnight
pub(crate) async fn chats_today(db: &sqlx::SqlitePool, user_id: &str) -> Result<i64, ApiError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM ai_chats WHERE user_id = ? AND created_at >= datetime('now', 'start of day')",
    )
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(count)
}

fn map_provider_error(e: OpenRouterError) -> ApiError {
    match e {
        OpenRouterError::RateLimited => ApiError::TooManyRequests(
            "AI provider rate limit reached. Please try again later.".to_string(),
        ),
        other => {
            error!(error = %other, "AI provider request failed");
            ApiError::InternalServer("AI request failed".to_string())
        }
    }
}

/// POST /api/ai/chat
/// Runs a completion if the caller is within their plan's daily allowance,
/// then records the turn.
pub async fn chat(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<ChatPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if payload.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("Prompt is required".to_string()));
    }

    let limit = authed.plan().daily_chat_limit();
    let used_today = chats_today(&state.db, &authed.user.id).await?;

    if let Some(limit) = limit {
        if used_today >= limit {
            warn!(
                user_id = %authed.user.id,
                used_today = used_today,
                limit = limit,
                "Daily AI allowance exhausted"
            );
            return Err(ApiError::TooManyRequests(
                "Daily AI request limit reached. Please upgrade your plan.".to_string(),
            ));
        }
    }

    let completion = state
        .openrouter
        .chat(&payload.prompt, &payload.model)
        .await
        .map_err(map_provider_error)?;

    let chat_id = generate_chat_id();
    sqlx::query(
        "INSERT INTO ai_chats (id, user_id, prompt, response, model, tokens) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&chat_id)
    .bind(&authed.user.id)
    .bind(&payload.prompt)
    .bind(&completion.content)
    .bind(&payload.model)
    .bind(completion.tokens)
    .execute(&state.db)
    .await?;

    info!(
        user_id = %authed.user.id,
        chat_id = %chat_id,
        model = %payload.model,
        tokens = completion.tokens,
        "Chat completion recorded"
    );

    let remaining = match limit {
        Some(limit) => serde_json::json!(limit - used_today - 1),
        None => serde_json::json!("unlimited"),
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "response": completion.content,
        "tokens": completion.tokens,
        "chatId": chat_id,
        "remainingRequests": remaining,
    })))
}

/// GET /api/ai/history
pub async fn history(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let chats = sqlx::query_as::<_, AiChat>(
        "SELECT * FROM ai_chats WHERE user_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
    )
    .bind(&authed.user.id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ai_chats WHERE user_id = ?")
        .bind(&authed.user.id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "chats": chats,
        "total": total,
        "limit": limit,
        "offset": offset,
    })))
}

/// DELETE /api/ai/history/:id
/// Ownership is enforced in the WHERE clause; a foreign chat id looks the
/// same as a missing one.
pub async fn delete_chat(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    delete_owned_chat(&state.db, &id, &authed.user.id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Chat deleted successfully",
    })))
}

pub(crate) async fn delete_owned_chat(
    db: &sqlx::SqlitePool,
    chat_id: &str,
    user_id: &str,
) -> Result<(), ApiError> {
    let deleted = sqlx::query("DELETE FROM ai_chats WHERE id = ? AND user_id = ?")
        .bind(chat_id)
        .bind(user_id)
        .execute(db)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("Chat not found".to_string()));
    }
    Ok(())
}

/// POST /api/ai/generate-image
/// PREMIUM and above only.
pub async fn generate_image(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<GenerateImagePayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    authed.require_plan(Plan::Premium)?;

    if payload.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("Prompt is required".to_string()));
    }

    let image_url = state
        .openrouter
        .generate_image(&payload.prompt, &payload.size)
        .await
        .map_err(map_provider_error)?;

    info!(user_id = %authed.user.id, "Image generated");

    Ok(Json(serde_json::json!({
        "success": true,
        "imageUrl": image_url,
    })))
}
