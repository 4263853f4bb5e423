//! Tests for the billing module: ledger transitions and capture atomicity

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use super::handlers::entitlement_outcome;
use super::ledger::{CaptureOutcome, SubscriptionLedger};
use super::models::{Plan, SubscriptionStatus};
use crate::auth::store::CredentialStore;
use crate::common::ApiError;
use crate::services::paypal::CapturedOrder;

async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    crate::common::migrations::run_migrations(&pool).await.unwrap();
    pool
}

async fn seed_user(pool: &SqlitePool, email: &str) -> String {
    let store = CredentialStore::new(pool.clone());
    store
        .create_local(email, "password123", "Test User")
        .await
        .unwrap()
        .id
}

async fn payment_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM payments")
        .fetch_one(pool)
        .await
        .unwrap()
}

fn capture(order_id: &str, amount: f64) -> CaptureOutcome {
    CaptureOutcome {
        order_id: order_id.to_string(),
        amount,
        currency: "USD".to_string(),
        payer_id: Some("PAYER123".to_string()),
    }
}

#[test]
fn test_plan_parsing() {
    assert_eq!(Plan::parse("FREE"), Some(Plan::Free));
    assert_eq!(Plan::parse("ENTERPRISE"), Some(Plan::Enterprise));
    assert_eq!(Plan::parse("free"), None);
    assert_eq!(Plan::parse("GOLD"), None);
}

#[test]
fn test_daily_chat_limits() {
    assert_eq!(Plan::Free.daily_chat_limit(), Some(10));
    assert_eq!(Plan::Basic.daily_chat_limit(), Some(100));
    assert_eq!(Plan::Premium.daily_chat_limit(), None);
    assert_eq!(Plan::Enterprise.daily_chat_limit(), None);
}

#[tokio::test]
async fn test_apply_capture_grants_entitlement_and_records_payment() {
    let pool = test_pool().await;
    let ledger = SubscriptionLedger::new(pool.clone());
    let user_id = seed_user(&pool, "buyer@example.com").await;

    let (subscription, payment) = ledger
        .apply_capture(&user_id, Plan::Premium, &capture("ORDER-1", 29.99))
        .await
        .unwrap();

    assert_eq!(subscription.plan, Plan::Premium);
    assert_eq!(subscription.status, SubscriptionStatus::Active);
    assert_eq!(subscription.paypal_subscription_id.as_deref(), Some("ORDER-1"));
    assert!(!subscription.cancel_at_period_end);
    assert!(subscription.current_period_end.is_some());

    assert_eq!(payment.subscription_id, subscription.id);
    assert_eq!(payment.amount, 29.99);
    assert_eq!(payment.status, "COMPLETED");
    assert_eq!(payment.paypal_order_id, "ORDER-1");
    assert_eq!(payment.paypal_payer_id.as_deref(), Some("PAYER123"));
}

#[tokio::test]
async fn test_capture_replay_is_idempotent() {
    let pool = test_pool().await;
    let ledger = SubscriptionLedger::new(pool.clone());
    let user_id = seed_user(&pool, "replay@example.com").await;

    let (_, first) = ledger
        .apply_capture(&user_id, Plan::Basic, &capture("ORDER-2", 9.99))
        .await
        .unwrap();
    let (subscription, second) = ledger
        .apply_capture(&user_id, Plan::Basic, &capture("ORDER-2", 9.99))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(payment_count(&pool).await, 1);
    assert_eq!(subscription.plan, Plan::Basic);
}

#[tokio::test]
async fn test_capture_for_unknown_user_leaves_no_payment_row() {
    let pool = test_pool().await;
    let ledger = SubscriptionLedger::new(pool.clone());

    let result = ledger
        .apply_capture("U_MISSING", Plan::Premium, &capture("ORDER-3", 29.99))
        .await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
    // The transaction rolled back before the insert could land.
    assert_eq!(payment_count(&pool).await, 0);
}

#[tokio::test]
async fn test_non_completed_capture_leaves_ledger_untouched() {
    let pool = test_pool().await;
    let ledger = SubscriptionLedger::new(pool.clone());
    let user_id = seed_user(&pool, "pending@example.com").await;

    let before = ledger.for_user(&user_id).await.unwrap().unwrap();

    // Approval abandoned or capture declined: the provider reports anything
    // but COMPLETED and the gate must refuse to produce a ledger transition.
    let pending = CapturedOrder {
        order_id: "ORDER-PENDING".to_string(),
        status: "PENDING".to_string(),
        amount: 29.99,
        currency: "USD".to_string(),
        payer_id: None,
    };
    assert!(matches!(
        entitlement_outcome(pending),
        Err(ApiError::PaymentNotCompleted)
    ));

    let after = ledger.for_user(&user_id).await.unwrap().unwrap();
    assert_eq!(before.plan, after.plan);
    assert_eq!(before.status, after.status);
    assert_eq!(before.paypal_subscription_id, after.paypal_subscription_id);
    assert_eq!(before.current_period_start, after.current_period_start);
    assert_eq!(before.current_period_end, after.current_period_end);
    assert_eq!(before.cancel_at_period_end, after.cancel_at_period_end);
    assert_eq!(payment_count(&pool).await, 0);
}

#[test]
fn test_completed_capture_produces_outcome() {
    let completed = CapturedOrder {
        order_id: "ORDER-DONE".to_string(),
        status: "COMPLETED".to_string(),
        amount: 9.99,
        currency: "USD".to_string(),
        payer_id: Some("PAYER123".to_string()),
    };

    let outcome = entitlement_outcome(completed).unwrap();
    assert_eq!(outcome.order_id, "ORDER-DONE");
    assert_eq!(outcome.amount, 9.99);
    assert_eq!(outcome.payer_id.as_deref(), Some("PAYER123"));
}

#[tokio::test]
async fn test_change_plan_resets_period() {
    let pool = test_pool().await;
    let ledger = SubscriptionLedger::new(pool.clone());
    let user_id = seed_user(&pool, "upgrader@example.com").await;

    let subscription = ledger.change_plan(&user_id, Plan::Basic).await.unwrap();

    assert_eq!(subscription.plan, Plan::Basic);
    assert!(subscription.current_period_end.is_some());
    assert_eq!(payment_count(&pool).await, 0);
}

#[tokio::test]
async fn test_change_plan_for_unknown_user_fails() {
    let pool = test_pool().await;
    let ledger = SubscriptionLedger::new(pool.clone());

    let result = ledger.change_plan("U_MISSING", Plan::Basic).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_cancel_marks_lapse_at_period_end() {
    let pool = test_pool().await;
    let ledger = SubscriptionLedger::new(pool.clone());
    let user_id = seed_user(&pool, "canceler@example.com").await;

    ledger
        .apply_capture(&user_id, Plan::Premium, &capture("ORDER-4", 29.99))
        .await
        .unwrap();

    let subscription = ledger.cancel(&user_id).await.unwrap();

    assert!(subscription.cancel_at_period_end);
    assert_eq!(subscription.status, SubscriptionStatus::Canceled);
    // The plan stays until the period actually ends.
    assert_eq!(subscription.plan, Plan::Premium);
}

#[tokio::test]
async fn test_payment_history_is_newest_first() {
    let pool = test_pool().await;
    let ledger = SubscriptionLedger::new(pool.clone());
    let user_id = seed_user(&pool, "historian@example.com").await;

    ledger
        .apply_capture(&user_id, Plan::Basic, &capture("ORDER-5", 9.99))
        .await
        .unwrap();
    ledger
        .apply_capture(&user_id, Plan::Premium, &capture("ORDER-6", 29.99))
        .await
        .unwrap();

    let history = ledger.payment_history(&user_id).await.unwrap();
    assert_eq!(history.len(), 2);

    let order_ids: Vec<&str> = history.iter().map(|p| p.paypal_order_id.as_str()).collect();
    assert!(order_ids.contains(&"ORDER-5"));
    assert!(order_ids.contains(&"ORDER-6"));
}

#[tokio::test]
async fn test_recent_payments_respects_limit() {
    let pool = test_pool().await;
    let ledger = SubscriptionLedger::new(pool.clone());
    let user_id = seed_user(&pool, "frequent@example.com").await;

    for i in 0..4 {
        ledger
            .apply_capture(&user_id, Plan::Basic, &capture(&format!("ORDER-R{}", i), 9.99))
            .await
            .unwrap();
    }

    let subscription = ledger.for_user(&user_id).await.unwrap().unwrap();
    let recent = ledger.recent_payments(&subscription.id, 2).await.unwrap();
    assert_eq!(recent.len(), 2);
}
