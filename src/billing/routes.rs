//! Subscription and payment routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the billing router
///
/// # Routes
/// - `GET /api/subscription/plans` - Public plan catalog
/// - `GET /api/subscription/current` - Caller's subscription + recent payments
/// - `POST /api/subscription/update` - Direct plan change
/// - `POST /api/subscription/cancel` - Cancel at period end
/// - `POST /api/payment/create-order` - Create a checkout order
/// - `POST /api/payment/capture-order` - Capture and grant entitlement
/// - `GET /api/payment/history` - Full payment history
pub fn billing_routes() -> Router {
    Router::new()
        .route("/api/subscription/plans", get(handlers::plans))
        .route("/api/subscription/current", get(handlers::current))
        .route("/api/subscription/update", post(handlers::update))
        .route("/api/subscription/cancel", post(handlers::cancel))
        .route("/api/payment/create-order", post(handlers::create_order))
        .route("/api/payment/capture-order", post(handlers::capture_order))
        .route("/api/payment/history", get(handlers::history))
}
