//! Credential store: user identity persistence and password verification
//!
//! Every user creation path (local registration, first federated login) runs
//! in a single transaction that also inserts the default FREE/ACTIVE
//! subscription. A user row must never exist without a subscription row.

use async_trait::async_trait;
use bcrypt::{hash, verify};
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::models::{FederatedProfile, User};
use crate::common::{generate_subscription_id, generate_user_id, safe_email_log, ApiError};

/// bcrypt cost factor, matching the rest of the platform's credential tooling
const BCRYPT_COST: u32 = 12;

#[derive(Clone)]
pub struct CredentialStore {
    db: SqlitePool,
}

impl CredentialStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    /// Register a local (email + password) account.
    ///
    /// The password is stored only as a salted bcrypt hash. The user row and
    /// its default FREE/ACTIVE subscription are inserted in one transaction.
    pub async fn create_local(
        &self,
        email: &str,
        password_plain: &str,
        name: &str,
    ) -> Result<User, ApiError> {
        if self.find_by_email(email).await?.is_some() {
            warn!(email = %safe_email_log(email), "Registration rejected: email already in use");
            return Err(ApiError::DuplicateEmail);
        }

        let password_hash = hash(password_plain, BCRYPT_COST)
            .map_err(|e| ApiError::InternalServer(format!("password hashing failed: {}", e)))?;

        let user_id = generate_user_id();
        let mut tx = self.db.begin().await?;

        sqlx::query(
            "INSERT INTO users (id, email, password, name, role) VALUES (?, ?, ?, ?, 'USER')",
        )
        .bind(&user_id)
        .bind(email)
        .bind(&password_hash)
        .bind(name)
        .execute(&mut *tx)
        .await?;

        insert_default_subscription(&mut tx, &user_id).await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            email = %safe_email_log(email),
            "New local account created"
        );

        self.fetch_created(&user_id).await
    }

    /// Check a plaintext password against the stored hash.
    ///
    /// A federated-only account (no stored hash) is a distinct failure from a
    /// wrong password so the client can suggest social login instead.
    pub fn verify_password(&self, user: &User, password_plain: &str) -> Result<(), ApiError> {
        let stored_hash = match &user.password {
            Some(h) => h,
            None => {
                warn!(
                    user_id = %user.id,
                    "Password login attempted on a federated-only account"
                );
                return Err(ApiError::NoPasswordSet);
            }
        };

        let matches = verify(password_plain, stored_hash)
            .map_err(|e| ApiError::InternalServer(format!("password verify failed: {}", e)))?;

        if matches {
            Ok(())
        } else {
            Err(ApiError::InvalidCredentials)
        }
    }

    /// Find a user by federated identity, creating the account on first login.
    ///
    /// Provider id is the stronger identity signal and takes lookup priority
    /// over email. Idempotent: repeated calls with the same provider id return
    /// the same user. An email match does NOT backfill provider/provider_id
    /// onto the local row; a password account keeps its null provider columns.
    pub async fn find_or_create_federated(
        &self,
        profile: &FederatedProfile,
    ) -> Result<User, ApiError> {
        let existing = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE provider = ? AND provider_id = ?",
        )
        .bind(profile.provider)
        .bind(&profile.provider_id)
        .fetch_optional(&self.db)
        .await?;

        if let Some(user) = existing {
            return Ok(user);
        }

        // Fall back to email: a local account logging in via the provider for
        // the first time keeps its existing row.
        if let Some(user) = self.find_by_email(&profile.email).await? {
            return Ok(user);
        }

        let user_id = generate_user_id();
        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, avatar, provider, provider_id, role)
            VALUES (?, ?, ?, ?, ?, ?, 'USER')
            "#,
        )
        .bind(&user_id)
        .bind(&profile.email)
        .bind(profile.name.as_deref())
        .bind(profile.avatar.as_deref())
        .bind(profile.provider)
        .bind(&profile.provider_id)
        .execute(&mut *tx)
        .await?;

        insert_default_subscription(&mut tx, &user_id).await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            email = %safe_email_log(&profile.email),
            provider = %profile.provider,
            "New account created via federated login"
        );

        self.fetch_created(&user_id).await
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        name: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<User, ApiError> {
        sqlx::query(
            "UPDATE users SET name = COALESCE(?, name), avatar = COALESCE(?, avatar) WHERE id = ?",
        )
        .bind(name)
        .bind(avatar)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        self.find_by_id(user_id).await?.ok_or(ApiError::UserNotFound)
    }

    /// Delete an account; subscriptions, payments, chats, contacts and
    /// analytics rows cascade via foreign keys.
    pub async fn delete_account(&self, user_id: &str) -> Result<(), ApiError> {
        let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(ApiError::UserNotFound);
        }

        info!(user_id = %user_id, "Account deleted");
        Ok(())
    }

    async fn fetch_created(&self, user_id: &str) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;
        Ok(user)
    }
}

async fn insert_default_subscription(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    user_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO subscriptions
            (id, user_id, plan, status, current_period_start, current_period_end)
        VALUES
            (?, ?, 'FREE', 'ACTIVE', datetime('now'), datetime('now', '+30 days'))
        "#,
    )
    .bind(generate_subscription_id())
    .bind(user_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// A way of proving who the caller is.
///
/// Both login paths resolve to a `User` through this one interface; route
/// handlers and the token layer never care which variant ran.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, store: &CredentialStore) -> Result<User, ApiError>;
}

/// Email + password credentials
pub struct LocalCredentials {
    pub email: String,
    pub password: String,
}

#[async_trait]
impl Authenticator for LocalCredentials {
    async fn authenticate(&self, store: &CredentialStore) -> Result<User, ApiError> {
        let user = store
            .find_by_email(&self.email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;
        store.verify_password(&user, &self.password)?;
        Ok(user)
    }
}

#[async_trait]
impl Authenticator for FederatedProfile {
    async fn authenticate(&self, store: &CredentialStore) -> Result<User, ApiError> {
        store.find_or_create_federated(self).await
    }
}
