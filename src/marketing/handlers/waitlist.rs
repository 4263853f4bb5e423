//! Waitlist handlers

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::common::{generate_waitlist_id, safe_email_log, ApiError, AppState, ValidationResult};
use crate::marketing::models::WaitlistPayload;

/// POST /api/waitlist/join
/// Duplicate signups get a friendly 200 instead of an error; the email is
/// the natural key.
pub async fn join(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<WaitlistPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let mut validation = ValidationResult::new();
    validation.check_email("email", &payload.email);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let email = payload.email.trim().to_lowercase();

    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM waitlist WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    if existing.is_some() {
        return Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "message": "You are already on the waitlist!",
                "alreadyExists": true,
            })),
        ));
    }

    let entry_id = generate_waitlist_id();
    sqlx::query(
        "INSERT INTO waitlist (id, email, name, source, status) VALUES (?, ?, ?, ?, 'PENDING')",
    )
    .bind(&entry_id)
    .bind(&email)
    .bind(&payload.name)
    .bind(&payload.source)
    .execute(&state.db)
    .await?;

    info!(
        entry_id = %entry_id,
        email = %safe_email_log(&email),
        source = ?payload.source,
        "Waitlist signup"
    );

    state
        .email
        .send_waitlist_welcome(&email, payload.name.as_deref())
        .await;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Successfully joined the waitlist!",
            "waitlistEntry": {
                "id": entry_id,
                "email": email,
            },
        })),
    ))
}

/// GET /api/waitlist/count
pub async fn count(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM waitlist WHERE status = 'PENDING'")
        .fetch_one(&state.db)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "count": count,
    })))
}
