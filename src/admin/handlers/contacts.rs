//! Admin contact and waitlist management

use axum::extract::{Extension, Json, Path, Query};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::pagination_json;
use crate::admin::models::{ListQuery, UpdateContactStatusPayload};
use crate::auth::extractors::AuthedUser;
use crate::auth::models::Role;
use crate::common::{ApiError, AppState};
use crate::marketing::models::{Contact, WaitlistEntry};

const CONTACT_STATUSES: &[&str] = &["NEW", "IN_PROGRESS", "RESOLVED", "CLOSED"];

/// GET /api/admin/contacts
pub async fn list(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_role(&[Role::Admin])?;
    let state = state_lock.read().await.clone();

    let (page, limit, offset) = query.pagination(20);

    let (contacts, total) = match &query.status {
        Some(status) => {
            let contacts = sqlx::query_as::<_, Contact>(
                "SELECT * FROM contacts WHERE status = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&state.db)
            .await?;
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts WHERE status = ?")
                .bind(status)
                .fetch_one(&state.db)
                .await?;
            (contacts, total)
        }
        None => {
            let contacts = sqlx::query_as::<_, Contact>(
                "SELECT * FROM contacts ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&state.db)
            .await?;
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
                .fetch_one(&state.db)
                .await?;
            (contacts, total)
        }
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "contacts": contacts,
        "pagination": pagination_json(total, page, limit),
    })))
}

/// PATCH /api/admin/contacts/:id
pub async fn update_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateContactStatusPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_role(&[Role::Admin])?;
    let state = state_lock.read().await.clone();

    if !CONTACT_STATUSES.contains(&payload.status.as_str()) {
        return Err(ApiError::BadRequest("Invalid contact status".to_string()));
    }

    let updated = sqlx::query("UPDATE contacts SET status = ? WHERE id = ?")
        .bind(&payload.status)
        .bind(&id)
        .execute(&state.db)
        .await?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::NotFound("Contact not found".to_string()));
    }

    let contact = sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    info!(contact_id = %id, status = %payload.status, "Contact status updated");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Contact status updated",
        "contact": contact,
    })))
}

/// GET /api/admin/waitlist
pub async fn waitlist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_role(&[Role::Admin])?;
    let state = state_lock.read().await.clone();

    let (page, limit, offset) = query.pagination(50);

    let (entries, total) = match &query.status {
        Some(status) => {
            let entries = sqlx::query_as::<_, WaitlistEntry>(
                "SELECT * FROM waitlist WHERE status = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&state.db)
            .await?;
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM waitlist WHERE status = ?")
                .bind(status)
                .fetch_one(&state.db)
                .await?;
            (entries, total)
        }
        None => {
            let entries = sqlx::query_as::<_, WaitlistEntry>(
                "SELECT * FROM waitlist ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&state.db)
            .await?;
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM waitlist")
                .fetch_one(&state.db)
                .await?;
            (entries, total)
        }
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "waitlist": entries,
        "pagination": pagination_json(total, page, limit),
    })))
}
