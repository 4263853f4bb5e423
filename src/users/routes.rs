//! User profile routes

use axum::{
    routing::{delete, get},
    Router,
};

use super::handlers;

/// Creates and returns the user router
///
/// # Routes
/// - `GET /api/user/profile` - Profile with subscription and usage stats
/// - `PUT /api/user/profile` - Update name/avatar
/// - `DELETE /api/user/account` - Delete the account
pub fn user_routes() -> Router {
    Router::new()
        .route(
            "/api/user/profile",
            get(handlers::profile).put(handlers::update_profile),
        )
        .route("/api/user/account", delete(handlers::delete_account))
}
