//! Admin console routes. Every handler re-checks the ADMIN role itself.

use axum::{
    routing::{get, patch, put},
    Router,
};

use super::handlers::{contacts, content, dashboard, users};

/// Creates and returns the admin router
///
/// # Routes
/// - `GET /api/admin/stats` - Dashboard totals and revenue
/// - `GET /api/admin/users` - Paginated users with subscriptions
/// - `GET /api/admin/contacts` - Paginated contact submissions
/// - `PATCH /api/admin/contacts/:id` - Update contact status
/// - `GET /api/admin/waitlist` - Paginated waitlist
/// - `GET /api/admin/content` - All content including inactive
/// - `POST /api/admin/content` - Create content
/// - `PUT /api/admin/content/:id` - Update content
/// - `DELETE /api/admin/content/:id` - Delete content
pub fn admin_routes() -> Router {
    Router::new()
        .route("/api/admin/stats", get(dashboard::stats))
        .route("/api/admin/users", get(users::list))
        .route("/api/admin/contacts", get(contacts::list))
        .route("/api/admin/contacts/:id", patch(contacts::update_status))
        .route("/api/admin/waitlist", get(contacts::waitlist))
        .route(
            "/api/admin/content",
            get(content::list).post(content::create),
        )
        .route(
            "/api/admin/content/:id",
            put(content::update).delete(content::delete),
        )
}
