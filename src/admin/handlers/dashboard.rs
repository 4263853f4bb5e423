//! Admin dashboard stats

use axum::extract::{Extension, Json};
use sqlx::Row;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::extractors::AuthedUser;
use crate::auth::models::Role;
use crate::common::{ApiError, AppState};

/// GET /api/admin/stats
/// One-screen overview: totals, revenue, active subscriptions per plan.
pub async fn stats(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    authed.require_role(&[Role::Admin])?;
    let state = state_lock.read().await.clone();

    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db)
        .await?;
    let total_subscriptions: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE status = 'ACTIVE'")
            .fetch_one(&state.db)
            .await?;
    let total_revenue: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0.0) FROM payments WHERE status = 'COMPLETED'",
    )
    .fetch_one(&state.db)
    .await?;
    let total_contacts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
        .fetch_one(&state.db)
        .await?;
    let total_ai_chats: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ai_chats")
        .fetch_one(&state.db)
        .await?;
    let waitlist_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM waitlist")
        .fetch_one(&state.db)
        .await?;

    let plan_rows = sqlx::query(
        "SELECT plan, COUNT(*) AS count FROM subscriptions WHERE status = 'ACTIVE' GROUP BY plan",
    )
    .fetch_all(&state.db)
    .await?;

    let subscriptions_by_plan: Vec<serde_json::Value> = plan_rows
        .iter()
        .map(|row| {
            serde_json::json!({
                "plan": row.get::<String, _>("plan"),
                "count": row.get::<i64, _>("count"),
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "stats": {
            "totalUsers": total_users,
            "totalSubscriptions": total_subscriptions,
            "totalRevenue": total_revenue,
            "totalContacts": total_contacts,
            "totalAIChats": total_ai_chats,
            "waitlistCount": waitlist_count,
            "subscriptionsByPlan": subscriptions_by_plan,
        },
    })))
}
