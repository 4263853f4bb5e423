//! Admin user management

use axum::extract::{Extension, Json, Query};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::admin::models::ListQuery;
use crate::auth::extractors::AuthedUser;
use crate::auth::models::{Role, User};
use crate::common::{ApiError, AppState};

use super::pagination_json;

/// GET /api/admin/users
/// Paginated user list with subscriptions, optionally filtered by a
/// case-insensitive email/name search.
pub async fn list(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_role(&[Role::Admin])?;
    let state = state_lock.read().await.clone();

    let (page, limit, offset) = query.pagination(20);
    let pattern = query
        .search
        .as_deref()
        .map(|s| format!("%{}%", s.trim().to_lowercase()));

    let (users, total) = match &pattern {
        Some(pattern) => {
            let users = sqlx::query_as::<_, User>(
                r#"
                SELECT * FROM users
                WHERE lower(email) LIKE ? OR lower(COALESCE(name, '')) LIKE ?
                ORDER BY created_at DESC
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(pattern)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&state.db)
            .await?;
            let total: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM users WHERE lower(email) LIKE ? OR lower(COALESCE(name, '')) LIKE ?",
            )
            .bind(pattern)
            .bind(pattern)
            .fetch_one(&state.db)
            .await?;
            (users, total)
        }
        None => {
            let users = sqlx::query_as::<_, User>(
                "SELECT * FROM users ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&state.db)
            .await?;
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(&state.db)
                .await?;
            (users, total)
        }
    };

    let mut entries = Vec::with_capacity(users.len());
    for user in users {
        let subscription = state.ledger.for_user(&user.id).await?;
        entries.push(serde_json::json!({
            "id": user.id,
            "email": user.email,
            "name": user.name,
            "avatar": user.avatar,
            "provider": user.provider,
            "role": user.role,
            "createdAt": user.created_at,
            "subscription": subscription,
        }));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "users": entries,
        "pagination": pagination_json(total, page, limit),
    })))
}
