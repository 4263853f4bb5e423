// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Run all database migrations
///
/// Tables are created idempotently; set RESET_DB=true to drop and recreate
/// the schema from scratch (destroys all data).
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
    }

    create_account_tables(pool).await?;
    create_billing_tables(pool).await?;
    create_engagement_tables(pool).await?;
    create_indexes(pool).await?;
    seed_admin_roles(pool).await?;

    info!("Database migration completed");

    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let tables = [
        "ai_chats",
        "analytics",
        "content",
        "waitlist",
        "contacts",
        "payments",
        "subscriptions",
        "users",
    ];
    for table in tables {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn create_account_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password TEXT,
            name TEXT,
            avatar TEXT,
            provider TEXT,
            provider_id TEXT,
            role TEXT NOT NULL DEFAULT 'USER',
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_billing_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // One subscription per user, created in the same transaction as the user.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subscriptions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE,
            plan TEXT NOT NULL DEFAULT 'FREE',
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            current_period_start TEXT DEFAULT (datetime('now')),
            current_period_end TEXT,
            paypal_subscription_id TEXT,
            cancel_at_period_end INTEGER NOT NULL DEFAULT 0,
            created_at TEXT DEFAULT (datetime('now')),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Append-only payment ledger. paypal_order_id is the idempotency key.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS payments (
            id TEXT PRIMARY KEY,
            subscription_id TEXT NOT NULL,
            amount REAL NOT NULL,
            currency TEXT NOT NULL DEFAULT 'USD',
            status TEXT NOT NULL,
            paypal_order_id TEXT NOT NULL,
            paypal_payer_id TEXT,
            created_at TEXT DEFAULT (datetime('now')),
            FOREIGN KEY (subscription_id) REFERENCES subscriptions(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_engagement_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id TEXT PRIMARY KEY,
            user_id TEXT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            subject TEXT,
            message TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'NEW',
            created_at TEXT DEFAULT (datetime('now')),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS waitlist (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT,
            source TEXT,
            status TEXT NOT NULL DEFAULT 'PENDING',
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS content (
            id TEXT PRIMARY KEY,
            type TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            image_url TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            metadata TEXT,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analytics (
            id TEXT PRIMARY KEY,
            user_id TEXT,
            event TEXT NOT NULL,
            page TEXT,
            metadata TEXT,
            created_at TEXT DEFAULT (datetime('now')),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ai_chats (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            prompt TEXT NOT NULL,
            response TEXT NOT NULL,
            model TEXT NOT NULL,
            tokens INTEGER NOT NULL DEFAULT 0,
            created_at TEXT DEFAULT (datetime('now')),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_users_provider ON users(provider, provider_id)",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_payments_order ON payments(paypal_order_id)",
        "CREATE INDEX IF NOT EXISTS idx_payments_subscription ON payments(subscription_id)",
        "CREATE INDEX IF NOT EXISTS idx_contacts_user ON contacts(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_contacts_status ON contacts(status)",
        "CREATE INDEX IF NOT EXISTS idx_analytics_user ON analytics(user_id, created_at)",
        "CREATE INDEX IF NOT EXISTS idx_ai_chats_user ON ai_chats(user_id, created_at)",
        "CREATE INDEX IF NOT EXISTS idx_content_type ON content(type, sort_order)",
    ];

    for index in indexes {
        sqlx::query(index).execute(pool).await?;
    }

    Ok(())
}

/// Promote accounts listed in ADMIN_EMAILS to the ADMIN role.
/// Runs on every startup so role changes only need an env update + restart.
async fn seed_admin_roles(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let admin_emails = env::var("ADMIN_EMAILS").unwrap_or_default();

    for email in admin_emails
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
    {
        let updated = sqlx::query("UPDATE users SET role = 'ADMIN' WHERE lower(email) = ?")
            .bind(&email)
            .execute(pool)
            .await?;
        if updated.rows_affected() > 0 {
            info!(email = %crate::common::safe_email_log(&email), "Promoted user to ADMIN");
        }
    }

    Ok(())
}
