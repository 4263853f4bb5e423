//! Public site content handlers

use axum::extract::{Extension, Json, Path, Query};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::common::{ApiError, AppState};
use crate::marketing::models::{ContentItem, ContentQuery};

/// GET /api/content
/// All active content, optionally filtered by type, in display order.
pub async fn list(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let content = match &query.r#type {
        Some(content_type) => {
            sqlx::query_as::<_, ContentItem>(
                "SELECT * FROM content WHERE is_active = 1 AND type = ? ORDER BY sort_order ASC",
            )
            .bind(content_type)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, ContentItem>(
                "SELECT * FROM content WHERE is_active = 1 ORDER BY sort_order ASC",
            )
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "content": content,
    })))
}

/// GET /api/content/type/:type
pub async fn by_type(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(content_type): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let content = sqlx::query_as::<_, ContentItem>(
        "SELECT * FROM content WHERE is_active = 1 AND type = ? ORDER BY sort_order ASC",
    )
    .bind(&content_type)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "content": content,
    })))
}
