//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/register` - Local account registration
/// - `POST /api/auth/login` - Local credential login
/// - `GET /api/auth/google` - Start the Google OAuth flow
/// - `GET /api/auth/google/callback` - OAuth callback
/// - `POST /api/auth/logout` - Clear the auth cookie
/// - `GET /api/auth/verify` - Validate the current token
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/google", get(handlers::google_start))
        .route("/api/auth/google/callback", get(handlers::google_callback))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/verify", get(handlers::verify))
}
