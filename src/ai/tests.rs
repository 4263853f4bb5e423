//! Tests for the AI module: daily usage counting and chat ownership

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use super::handlers::{chats_today, delete_owned_chat};
use crate::auth::store::CredentialStore;
use crate::common::{generate_chat_id, ApiError};

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
        .create_local(email, "password123", "Chat User")
        .await
        .unwrap()
        .id
}

async fn insert_chat(pool: &SqlitePool, user_id: &str, created_at: Option<&str>) -> String {
    let id = generate_chat_id();
    match created_at {
        Some(ts) => {
            sqlx::query(
                "INSERT INTO ai_chats (id, user_id, prompt, response, model, tokens, created_at) VALUES (?, ?, 'q', 'a', 'gpt-4', 10, ?)",
            )
            .bind(&id)
            .bind(user_id)
            .bind(ts)
            .execute(pool)
            .await
            .unwrap();
        }
        None => {
            sqlx::query(
                "INSERT INTO ai_chats (id, user_id, prompt, response, model, tokens) VALUES (?, ?, 'q', 'a', 'gpt-4', 10)",
            )
            .bind(&id)
            .bind(user_id)
            .execute(pool)
            .await
            .unwrap();
        }
    }
    id
}

#[tokio::test]
async fn test_daily_count_only_sees_today() {
    let pool = test_pool().await;
    let user_id = seed_user(&pool, "today@example.com").await;

    insert_chat(&pool, &user_id, None).await;
    insert_chat(&pool, &user_id, None).await;
    // Yesterday's chats must not count against today's allowance.
    insert_chat(&pool, &user_id, Some("2020-01-01 10:00:00")).await;

    assert_eq!(chats_today(&pool, &user_id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_daily_count_is_per_user() {
    let pool = test_pool().await;
    let alice = seed_user(&pool, "alice.chat@example.com").await;
    let bob = seed_user(&pool, "bob.chat@example.com").await;

    insert_chat(&pool, &alice, None).await;
    insert_chat(&pool, &alice, None).await;
    insert_chat(&pool, &bob, None).await;

    assert_eq!(chats_today(&pool, &alice).await.unwrap(), 2);
    assert_eq!(chats_today(&pool, &bob).await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_requires_ownership() {
    let pool = test_pool().await;
    let owner = seed_user(&pool, "owner.chat@example.com").await;
    let intruder = seed_user(&pool, "intruder.chat@example.com").await;

    let chat_id = insert_chat(&pool, &owner, None).await;

    // A foreign chat id looks the same as a missing one.
    let result = delete_owned_chat(&pool, &chat_id, &intruder).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
    assert_eq!(chats_today(&pool, &owner).await.unwrap(), 1);

    delete_owned_chat(&pool, &chat_id, &owner).await.unwrap();
    assert_eq!(chats_today(&pool, &owner).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_missing_chat_is_not_found() {
    let pool = test_pool().await;
    let user_id = seed_user(&pool, "deleter@example.com").await;

    let result = delete_owned_chat(&pool, "CH_MISSING", &user_id).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}
