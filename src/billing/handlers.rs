//! Subscription and payment handlers

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::ledger::CaptureOutcome;
use super::models::{
    plan_catalog, CaptureOrderPayload, CreateOrderPayload, Plan, UpdatePlanPayload,
};
use crate::auth::extractors::AuthedUser;
use crate::common::{ApiError, AppState};
use crate::services::paypal::CapturedOrder;

fn parse_plan(value: &str) -> Result<Plan, ApiError> {
    Plan::parse(value).ok_or_else(|| ApiError::BadRequest("Invalid plan".to_string()))
}

/// Gate between the provider capture and the ledger: only a COMPLETED
/// capture becomes a ledger transition, anything else is rejected before any
/// state is touched.
pub(crate) fn entitlement_outcome(captured: CapturedOrder) -> Result<CaptureOutcome, ApiError> {
    if !captured.is_completed() {
        return Err(ApiError::PaymentNotCompleted);
    }
    Ok(CaptureOutcome {
        order_id: captured.order_id,
        amount: captured.amount,
        currency: captured.currency,
        payer_id: captured.payer_id,
    })
}

/// GET /api/subscription/plans
/// Public plan catalog for the pricing page.
pub async fn plans() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "plans": plan_catalog(),
    }))
}

/// GET /api/subscription/current
/// The caller's subscription with its most recent payments.
pub async fn current(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let payments = match &authed.subscription {
        Some(sub) => state.ledger.recent_payments(&sub.id, 5).await?,
        None => Vec::new(),
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "subscription": authed.subscription,
        "payments": payments,
    })))
}

/// POST /api/subscription/update
/// Direct plan change without a payment (downgrades, comped upgrades).
pub async fn update(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<UpdatePlanPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();
    let plan = parse_plan(&payload.plan)?;

    let subscription = state.ledger.change_plan(&authed.user.id, plan).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Subscription updated successfully",
        "subscription": subscription,
    })))
}

/// POST /api/subscription/cancel
/// Marks the subscription to lapse at the end of the paid period.
pub async fn cancel(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let subscription = state.ledger.cancel(&authed.user.id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Subscription will be canceled at the end of the billing period",
        "subscription": subscription,
    })))
}

/// POST /api/payment/create-order
/// First phase of checkout: create a provider order and hand the approval
/// URL back to the client. No local state changes yet.
pub async fn create_order(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();
    let plan = parse_plan(&payload.plan)?;

    if payload.amount <= 0.0 {
        return Err(ApiError::BadRequest(
            "Plan and amount are required".to_string(),
        ));
    }

    let order = state
        .paypal
        .create_order(plan, payload.amount)
        .await
        .map_err(|e| {
            error!(user_id = %authed.user.id, error = %e, "PayPal order creation failed");
            ApiError::PaymentProviderError
        })?;

    info!(
        user_id = %authed.user.id,
        order_id = %order.order_id,
        plan = %plan.as_str(),
        "Checkout order created"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "orderId": order.order_id,
        "approvalUrl": order.approval_url,
    })))
}

/// POST /api/payment/capture-order
/// Second phase of checkout: capture the approved order and, only if the
/// provider confirms COMPLETED, grant the plan and record the payment in one
/// transaction.
pub async fn capture_order(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<CaptureOrderPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();
    let plan = parse_plan(&payload.plan)?;

    if payload.order_id.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Order ID and plan are required".to_string(),
        ));
    }

    let captured = state
        .paypal
        .capture_order(&payload.order_id)
        .await
        .map_err(|e| {
            error!(
                user_id = %authed.user.id,
                order_id = %payload.order_id,
                error = %e,
                "PayPal capture failed"
            );
            ApiError::PaymentProviderError
        })?;

    let order_status = captured.status.clone();
    let outcome = entitlement_outcome(captured).map_err(|e| {
        warn!(
            user_id = %authed.user.id,
            order_id = %payload.order_id,
            order_status = %order_status,
            "Capture did not complete, no entitlement granted"
        );
        e
    })?;
    let (subscription, payment) = state
        .ledger
        .apply_capture(&authed.user.id, plan, &outcome)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Payment successful",
        "subscription": subscription,
        "payment": payment,
    })))
}

/// GET /api/payment/history
pub async fn history(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let payments = state.ledger.payment_history(&authed.user.id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "payments": payments,
    })))
}
