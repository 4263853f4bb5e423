//! Tests for the marketing module: schema constraints and row mapping

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use super::models::{AnalyticsEvent, Contact, ContentItem, WaitlistEntry};
use crate::auth::store::CredentialStore;
use crate::common::{
    generate_analytics_id, generate_contact_id, generate_content_id, generate_waitlist_id,
};

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

#[tokio::test]
async fn test_anonymous_contact_has_no_user() {
    let pool = test_pool().await;

    let id = generate_contact_id();
    sqlx::query(
        "INSERT INTO contacts (id, user_id, name, email, subject, message, status) VALUES (?, NULL, 'Visitor', 'visitor@example.com', NULL, 'I have a question about plans', 'NEW')",
    )
    .bind(&id)
    .execute(&pool)
    .await
    .unwrap();

    let contact = sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE id = ?")
        .bind(&id)
        .fetch_one(&pool)
        .await
        .unwrap();

    assert!(contact.user_id.is_none());
    assert_eq!(contact.status, "NEW");
}

#[tokio::test]
async fn test_waitlist_email_is_unique() {
    let pool = test_pool().await;

    sqlx::query("INSERT INTO waitlist (id, email, status) VALUES (?, 'fan@example.com', 'PENDING')")
        .bind(generate_waitlist_id())
        .execute(&pool)
        .await
        .unwrap();

    let duplicate = sqlx::query(
        "INSERT INTO waitlist (id, email, status) VALUES (?, 'fan@example.com', 'PENDING')",
    )
    .bind(generate_waitlist_id())
    .execute(&pool)
    .await;

    assert!(duplicate.is_err());

    let entry = sqlx::query_as::<_, WaitlistEntry>("SELECT * FROM waitlist WHERE email = ?")
        .bind("fan@example.com")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(entry.status, "PENDING");
}

#[tokio::test]
async fn test_content_serializes_order_field() {
    let pool = test_pool().await;

    sqlx::query(
        "INSERT INTO content (id, type, title, sort_order, is_active) VALUES (?, 'feature', 'Fast AI', 2, 1)",
    )
    .bind(generate_content_id())
    .execute(&pool)
    .await
    .unwrap();

    let item = sqlx::query_as::<_, ContentItem>("SELECT * FROM content WHERE title = 'Fast AI'")
        .fetch_one(&pool)
        .await
        .unwrap();

    let json = serde_json::to_value(&item).unwrap();
    // The SQL column is sort_order; the API field stays "order".
    assert_eq!(json["order"], 2);
    assert_eq!(json["type"], "feature");
    assert!(json.get("sort_order").is_none());
}

#[tokio::test]
async fn test_inactive_content_is_filtered() {
    let pool = test_pool().await;

    for (title, order, active) in [("First", 1, 1), ("Hidden", 2, 0), ("Second", 3, 1)] {
        sqlx::query(
            "INSERT INTO content (id, type, title, sort_order, is_active) VALUES (?, 'feature', ?, ?, ?)",
        )
        .bind(generate_content_id())
        .bind(title)
        .bind(order)
        .bind(active)
        .execute(&pool)
        .await
        .unwrap();
    }

    let visible = sqlx::query_as::<_, ContentItem>(
        "SELECT * FROM content WHERE is_active = 1 AND type = ? ORDER BY sort_order ASC",
    )
    .bind("feature")
    .fetch_all(&pool)
    .await
    .unwrap();

    let titles: Vec<&str> = visible.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
}

#[tokio::test]
async fn test_analytics_cascade_on_account_deletion() {
    let pool = test_pool().await;
    let store = CredentialStore::new(pool.clone());
    let user = store
        .create_local("tracked@example.com", "password123", "Tracked")
        .await
        .unwrap();

    sqlx::query("INSERT INTO analytics (id, user_id, event, page) VALUES (?, ?, 'page_view', '/pricing')")
        .bind(generate_analytics_id())
        .bind(&user.id)
        .execute(&pool)
        .await
        .unwrap();

    store.delete_account(&user.id).await.unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM analytics")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_analytics_event_row_mapping() {
    let pool = test_pool().await;

    sqlx::query(
        "INSERT INTO analytics (id, user_id, event, page, metadata) VALUES (?, NULL, 'signup_click', '/', '{\"button\":\"hero\"}')",
    )
    .bind(generate_analytics_id())
    .execute(&pool)
    .await
    .unwrap();

    let event = sqlx::query_as::<_, AnalyticsEvent>("SELECT * FROM analytics LIMIT 1")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(event.event, "signup_click");
    assert!(event.user_id.is_none());
    assert!(event.metadata.as_deref().unwrap().contains("hero"));
}
