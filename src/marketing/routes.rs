//! Marketing routes: contact, waitlist, analytics, site content

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{analytics, contact, content, waitlist};

/// Creates and returns the marketing router
///
/// # Routes
/// - `POST /api/contact/submit` - Contact form (anonymous allowed)
/// - `GET /api/contact/my-submissions` - Caller's submissions
/// - `POST /api/waitlist/join` - Join the waitlist
/// - `GET /api/waitlist/count` - Pending signup count
/// - `POST /api/analytics/track` - Event ingestion (anonymous allowed)
/// - `GET /api/analytics/user` - Caller's events and per-event totals
/// - `GET /api/content` - Active content (optional ?type=)
/// - `GET /api/content/type/:type` - Active content of a type
pub fn marketing_routes() -> Router {
    Router::new()
        .route("/api/contact/submit", post(contact::submit))
        .route("/api/contact/my-submissions", get(contact::my_submissions))
        .route("/api/waitlist/join", post(waitlist::join))
        .route("/api/waitlist/count", get(waitlist::count))
        .route("/api/analytics/track", post(analytics::track))
        .route("/api/analytics/user", get(analytics::user_analytics))
        .route("/api/content", get(content::list))
        .route("/api/content/type/:type", get(content::by_type))
}
