//! Admin content management (CRUD over the public site content)

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::admin::models::{CreateContentPayload, UpdateContentPayload};
use crate::auth::extractors::AuthedUser;
use crate::auth::models::Role;
use crate::common::{generate_content_id, ApiError, AppState, ValidationResult};
use crate::marketing::models::ContentItem;

async fn fetch_content(db: &sqlx::SqlitePool, id: &str) -> Result<ContentItem, ApiError> {
    sqlx::query_as::<_, ContentItem>("SELECT * FROM content WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Content not found".to_string()))
}

/// GET /api/admin/content
/// Everything including inactive rows, grouped by type then display order.
pub async fn list(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_role(&[Role::Admin])?;
    let state = state_lock.read().await.clone();

    let content = sqlx::query_as::<_, ContentItem>(
        "SELECT * FROM content ORDER BY type ASC, sort_order ASC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "content": content,
    })))
}

/// POST /api/admin/content
pub async fn create(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<CreateContentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    authed.require_role(&[Role::Admin])?;
    let state = state_lock.read().await.clone();

    let mut validation = ValidationResult::new();
    validation.check_not_empty("type", &payload.r#type);
    validation.check_not_empty("title", &payload.title);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let content_id = generate_content_id();
    let metadata = payload.metadata.as_ref().map(|m| m.to_string());

    sqlx::query(
        r#"
        INSERT INTO content (id, type, title, description, image_url, sort_order, is_active, metadata)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&content_id)
    .bind(&payload.r#type)
    .bind(payload.title.trim())
    .bind(&payload.description)
    .bind(&payload.image_url)
    .bind(payload.order.unwrap_or(0))
    .bind(payload.is_active.unwrap_or(true))
    .bind(&metadata)
    .execute(&state.db)
    .await?;

    let content = fetch_content(&state.db, &content_id).await?;

    info!(content_id = %content_id, content_type = %payload.r#type, "Content created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Content created successfully",
            "content": content,
        })),
    ))
}

/// PUT /api/admin/content/:id
/// Partial update; omitted fields keep their current values.
pub async fn update(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateContentPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_role(&[Role::Admin])?;
    let state = state_lock.read().await.clone();

    let metadata = payload.metadata.as_ref().map(|m| m.to_string());

    let updated = sqlx::query(
        r#"
        UPDATE content
        SET type = COALESCE(?, type),
            title = COALESCE(?, title),
            description = COALESCE(?, description),
            image_url = COALESCE(?, image_url),
            sort_order = COALESCE(?, sort_order),
            is_active = COALESCE(?, is_active),
            metadata = COALESCE(?, metadata)
        WHERE id = ?
        "#,
    )
    .bind(&payload.r#type)
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.image_url)
    .bind(payload.order)
    .bind(payload.is_active)
    .bind(&metadata)
    .bind(&id)
    .execute(&state.db)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::NotFound("Content not found".to_string()));
    }

    let content = fetch_content(&state.db, &id).await?;

    info!(content_id = %id, "Content updated");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Content updated successfully",
        "content": content,
    })))
}

/// DELETE /api/admin/content/:id
pub async fn delete(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_role(&[Role::Admin])?;
    let state = state_lock.read().await.clone();

    let deleted = sqlx::query("DELETE FROM content WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("Content not found".to_string()));
    }

    info!(content_id = %id, "Content deleted");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Content deleted successfully",
    })))
}
