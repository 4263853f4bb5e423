//! Contact form handlers

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::extractors::AuthedUser;
use crate::common::{generate_contact_id, safe_email_log, ApiError, AppState, ValidationResult};
use crate::marketing::models::{Contact, ContactPayload};

/// POST /api/contact/submit
/// Works for anonymous visitors; a valid token attaches the submission to
/// the account. The support notification is best-effort.
pub async fn submit(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: Option<AuthedUser>,
    Json(payload): Json<ContactPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let mut validation = ValidationResult::new();
    validation.check_not_empty("name", &payload.name);
    validation.check_email("email", &payload.email);
    validation.check_min_length("message", &payload.message, 10);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let contact_id = generate_contact_id();
    let user_id = authed.as_ref().map(|a| a.user.id.clone());

    sqlx::query(
        "INSERT INTO contacts (id, user_id, name, email, subject, message, status) VALUES (?, ?, ?, ?, ?, ?, 'NEW')",
    )
    .bind(&contact_id)
    .bind(&user_id)
    .bind(payload.name.trim())
    .bind(payload.email.trim())
    .bind(&payload.subject)
    .bind(&payload.message)
    .execute(&state.db)
    .await?;

    info!(
        contact_id = %contact_id,
        email = %safe_email_log(&payload.email),
        authenticated = user_id.is_some(),
        "Contact form submitted"
    );

    state
        .email
        .send_contact_notification(
            payload.name.trim(),
            payload.email.trim(),
            payload.subject.as_deref(),
            &payload.message,
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Your message has been sent successfully. We will get back to you soon!",
            "contact": {
                "id": contact_id,
                "name": payload.name.trim(),
                "email": payload.email.trim(),
            },
        })),
    ))
}

/// GET /api/contact/my-submissions
pub async fn my_submissions(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let contacts = sqlx::query_as::<_, Contact>(
        "SELECT * FROM contacts WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(&authed.user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "contacts": contacts,
    })))
}
