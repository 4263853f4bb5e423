//! Tests for the auth module: credential store invariants and gate logic

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use super::extractors::AuthedUser;
use super::models::{FederatedProfile, Role, User};
use super::store::{Authenticator, CredentialStore, LocalCredentials};
use crate::billing::models::{Plan, Subscription, SubscriptionStatus};
use crate::common::ApiError;

async fn test_pool() -> SqlitePool {
    // A single shared connection keeps the in-memory database alive and
    // visible to every query in the test.
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

async fn subscription_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions")
        .fetch_one(pool)
        .await
        .unwrap()
}

fn google_profile(provider_id: &str, email: &str) -> FederatedProfile {
    FederatedProfile {
        provider: "google",
        provider_id: provider_id.to_string(),
        email: email.to_string(),
        name: Some("Fed User".to_string()),
        avatar: None,
    }
}

#[tokio::test]
async fn test_register_creates_user_with_free_active_subscription() {
    let pool = test_pool().await;
    let store = CredentialStore::new(pool.clone());

    let user = store
        .create_local("alice@example.com", "password123", "Alice")
        .await
        .unwrap();

    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.role, Role::User);
    assert!(user.password.is_some());

    let sub = sqlx::query_as::<_, Subscription>(
        "SELECT * FROM subscriptions WHERE user_id = ?",
    )
    .bind(&user.id)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(sub.plan, Plan::Free);
    assert_eq!(sub.status, SubscriptionStatus::Active);
    assert!(sub.current_period_end.is_some());
}

#[tokio::test]
async fn test_duplicate_email_rejected_without_second_subscription() {
    let pool = test_pool().await;
    let store = CredentialStore::new(pool.clone());

    store
        .create_local("bob@example.com", "password123", "Bob")
        .await
        .unwrap();

    let result = store
        .create_local("bob@example.com", "otherpassword", "Bob Again")
        .await;

    assert!(matches!(result, Err(ApiError::DuplicateEmail)));
    assert_eq!(subscription_count(&pool).await, 1);
}

#[tokio::test]
async fn test_password_verification() {
    let pool = test_pool().await;
    let store = CredentialStore::new(pool.clone());

    let user = store
        .create_local("carol@example.com", "password123", "Carol")
        .await
        .unwrap();

    assert!(store.verify_password(&user, "password123").is_ok());
    assert!(matches!(
        store.verify_password(&user, "wrong-password"),
        Err(ApiError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_federated_only_account_fails_with_no_password_set() {
    let pool = test_pool().await;
    let store = CredentialStore::new(pool.clone());

    let user = store
        .find_or_create_federated(&google_profile("goog-123", "dave@example.com"))
        .await
        .unwrap();
    assert!(user.password.is_none());

    // Distinct from a wrong password: the client should suggest social login.
    assert!(matches!(
        store.verify_password(&user, "anything"),
        Err(ApiError::NoPasswordSet)
    ));

    let credentials = LocalCredentials {
        email: "dave@example.com".to_string(),
        password: "anything".to_string(),
    };
    assert!(matches!(
        credentials.authenticate(&store).await,
        Err(ApiError::NoPasswordSet)
    ));
}

#[tokio::test]
async fn test_unknown_email_fails_with_invalid_credentials() {
    let pool = test_pool().await;
    let store = CredentialStore::new(pool.clone());

    let credentials = LocalCredentials {
        email: "nobody@example.com".to_string(),
        password: "password123".to_string(),
    };
    assert!(matches!(
        credentials.authenticate(&store).await,
        Err(ApiError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_federated_login_is_idempotent() {
    let pool = test_pool().await;
    let store = CredentialStore::new(pool.clone());
    let profile = google_profile("goog-456", "erin@example.com");

    let first = store.find_or_create_federated(&profile).await.unwrap();
    let second = store.find_or_create_federated(&profile).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(subscription_count(&pool).await, 1);
}

#[tokio::test]
async fn test_federated_login_links_existing_local_account_by_email() {
    let pool = test_pool().await;
    let store = CredentialStore::new(pool.clone());

    let local = store
        .create_local("frank@example.com", "password123", "Frank")
        .await
        .unwrap();

    let federated = store
        .find_or_create_federated(&google_profile("goog-789", "frank@example.com"))
        .await
        .unwrap();

    assert_eq!(local.id, federated.id);
    assert_eq!(subscription_count(&pool).await, 1);
}

#[tokio::test]
async fn test_provider_id_takes_priority_over_email() {
    let pool = test_pool().await;
    let store = CredentialStore::new(pool.clone());

    let original = store
        .find_or_create_federated(&google_profile("goog-111", "grace@example.com"))
        .await
        .unwrap();

    // Same provider id, different email (e.g. the user changed their Google
    // address): still the same account.
    let returned = store
        .find_or_create_federated(&google_profile("goog-111", "grace.new@example.com"))
        .await
        .unwrap();

    assert_eq!(original.id, returned.id);
    assert_eq!(returned.email, "grace@example.com");
}

#[tokio::test]
async fn test_account_deletion_cascades() {
    let pool = test_pool().await;
    let store = CredentialStore::new(pool.clone());

    let user = store
        .create_local("henry@example.com", "password123", "Henry")
        .await
        .unwrap();

    store.delete_account(&user.id).await.unwrap();

    assert!(store.find_by_id(&user.id).await.unwrap().is_none());
    assert_eq!(subscription_count(&pool).await, 0);
}

// ---- Gate logic ----

fn authed(role: Role, plan: Option<Plan>) -> AuthedUser {
    let user = User {
        id: "U_TEST01".to_string(),
        email: "gate@example.com".to_string(),
        password: None,
        name: None,
        avatar: None,
        provider: None,
        provider_id: None,
        role,
        created_at: None,
    };
    let subscription = plan.map(|p| Subscription {
        id: "SB_TEST01".to_string(),
        user_id: user.id.clone(),
        plan: p,
        status: SubscriptionStatus::Active,
        current_period_start: None,
        current_period_end: None,
        paypal_subscription_id: None,
        cancel_at_period_end: false,
        created_at: None,
    });
    AuthedUser { user, subscription }
}

#[test]
fn test_role_gate() {
    assert!(authed(Role::Admin, None)
        .require_role(&[Role::Admin])
        .is_ok());
    assert!(matches!(
        authed(Role::User, None).require_role(&[Role::Admin]),
        Err(ApiError::Forbidden(_))
    ));
}

#[test]
fn test_plan_gate_is_a_strict_total_order() {
    // PREMIUM-gated route: FREE and BASIC rejected, PREMIUM and ENTERPRISE pass
    assert!(matches!(
        authed(Role::User, Some(Plan::Free)).require_plan(Plan::Premium),
        Err(ApiError::PlanRequired(Plan::Premium))
    ));
    assert!(matches!(
        authed(Role::User, Some(Plan::Basic)).require_plan(Plan::Premium),
        Err(ApiError::PlanRequired(Plan::Premium))
    ));
    assert!(authed(Role::User, Some(Plan::Premium))
        .require_plan(Plan::Premium)
        .is_ok());
    assert!(authed(Role::User, Some(Plan::Enterprise))
        .require_plan(Plan::Premium)
        .is_ok());
}

#[test]
fn test_plan_gate_rejects_missing_subscription() {
    assert!(matches!(
        authed(Role::User, None).require_plan(Plan::Basic),
        Err(ApiError::PlanRequired(Plan::Basic))
    ));
}

#[test]
fn test_plan_ordering() {
    assert!(Plan::Free < Plan::Basic);
    assert!(Plan::Basic < Plan::Premium);
    assert!(Plan::Premium < Plan::Enterprise);
}
