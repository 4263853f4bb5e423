//! Analytics event handlers

use axum::extract::{Extension, Json};
use sqlx::Row;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::auth::extractors::AuthedUser;
use crate::common::{generate_analytics_id, ApiError, AppState};
use crate::marketing::models::{AnalyticsEvent, TrackEventPayload};

/// POST /api/analytics/track
/// Fire-and-forget event ingestion, anonymous or attributed.
pub async fn track(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: Option<AuthedUser>,
    Json(payload): Json<TrackEventPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if payload.event.trim().is_empty() {
        return Err(ApiError::BadRequest("Event name is required".to_string()));
    }

    let event_id = generate_analytics_id();
    let user_id = authed.as_ref().map(|a| a.user.id.clone());
    let metadata = payload
        .metadata
        .as_ref()
        .map(|m| m.to_string());

    sqlx::query(
        "INSERT INTO analytics (id, user_id, event, page, metadata) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&event_id)
    .bind(&user_id)
    .bind(payload.event.trim())
    .bind(&payload.page)
    .bind(&metadata)
    .execute(&state.db)
    .await?;

    debug!(event = %payload.event, authenticated = user_id.is_some(), "Event tracked");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Event tracked successfully",
    })))
}

/// GET /api/analytics/user
/// The caller's recent events plus per-event totals.
pub async fn user_analytics(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let analytics = sqlx::query_as::<_, AnalyticsEvent>(
        "SELECT * FROM analytics WHERE user_id = ? ORDER BY created_at DESC LIMIT 100",
    )
    .bind(&authed.user.id)
    .fetch_all(&state.db)
    .await?;

    let rows = sqlx::query(
        "SELECT event, COUNT(*) AS count FROM analytics WHERE user_id = ? GROUP BY event",
    )
    .bind(&authed.user.id)
    .fetch_all(&state.db)
    .await?;

    let event_counts: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            serde_json::json!({
                "event": row.get::<String, _>("event"),
                "count": row.get::<i64, _>("count"),
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "analytics": analytics,
        "eventCounts": event_counts,
    })))
}
