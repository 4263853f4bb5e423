//! AI routes

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers;

/// Creates and returns the AI router
///
/// # Routes
/// - `POST /api/ai/chat` - Plan-limited chat completion
/// - `GET /api/ai/history` - Paginated chat history
/// - `DELETE /api/ai/history/:id` - Delete an owned chat
/// - `POST /api/ai/generate-image` - Image generation (PREMIUM+)
pub fn ai_routes() -> Router {
    Router::new()
        .route("/api/ai/chat", post(handlers::chat))
        .route("/api/ai/history", get(handlers::history))
        .route("/api/ai/history/:id", delete(handlers::delete_chat))
        .route("/api/ai/generate-image", post(handlers::generate_image))
}
