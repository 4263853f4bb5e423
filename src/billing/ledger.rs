//! Subscription ledger: the single entitlement record per user and its
//! payment history.
//!
//! The capture transition is the only multi-write mutation in the system:
//! the subscription update and the payment insert share one transaction so a
//! failure between them leaves neither applied.

use sqlx::SqlitePool;
use tracing::{info, warn};

use super::models::{Payment, Plan, Subscription};
use crate::common::{generate_payment_id, ApiError};

/// Outcome of a provider-side order capture, already confirmed COMPLETED
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub order_id: String,
    pub amount: f64,
    pub currency: String,
    pub payer_id: Option<String>,
}

#[derive(Clone)]
pub struct SubscriptionLedger {
    db: SqlitePool,
}

impl SubscriptionLedger {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn for_user(&self, user_id: &str) -> Result<Option<Subscription>, ApiError> {
        let sub = sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(sub)
    }

    /// Plan change without a payment (upgrade/downgrade bookkeeping);
    /// resets the 30-day period.
    pub async fn change_plan(&self, user_id: &str, plan: Plan) -> Result<Subscription, ApiError> {
        let updated = sqlx::query(
            r#"
            UPDATE subscriptions
            SET plan = ?, current_period_end = datetime('now', '+30 days')
            WHERE user_id = ?
            "#,
        )
        .bind(plan)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(ApiError::NotFound("Subscription not found".to_string()));
        }

        info!(user_id = %user_id, plan = %plan.as_str(), "Subscription plan updated");

        self.for_user(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Subscription not found".to_string()))
    }

    /// Mark the subscription to lapse at the end of the current period.
    pub async fn cancel(&self, user_id: &str) -> Result<Subscription, ApiError> {
        let updated = sqlx::query(
            r#"
            UPDATE subscriptions
            SET cancel_at_period_end = 1, status = 'CANCELED'
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(ApiError::NotFound("Subscription not found".to_string()));
        }

        info!(user_id = %user_id, "Subscription canceled at period end");

        self.for_user(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Subscription not found".to_string()))
    }

    /// Apply a confirmed payment capture: move the subscription to the paid
    /// plan and append the payment record, atomically.
    ///
    /// The provider order id is the idempotency key: re-capturing an order
    /// that is already on the ledger returns the existing rows instead of
    /// double-appending.
    pub async fn apply_capture(
        &self,
        user_id: &str,
        plan: Plan,
        capture: &CaptureOutcome,
    ) -> Result<(Subscription, Payment), ApiError> {
        let mut tx = self.db.begin().await?;

        if let Some(existing) = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE paypal_order_id = ?",
        )
        .bind(&capture.order_id)
        .fetch_optional(&mut *tx)
        .await?
        {
            warn!(
                user_id = %user_id,
                order_id = %capture.order_id,
                "Capture replay detected, returning existing payment"
            );
            drop(tx);
            let subscription = self
                .for_user(user_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Subscription not found".to_string()))?;
            return Ok((subscription, existing));
        }

        let updated = sqlx::query(
            r#"
            UPDATE subscriptions
            SET plan = ?,
                status = 'ACTIVE',
                paypal_subscription_id = ?,
                current_period_start = datetime('now'),
                current_period_end = datetime('now', '+30 days'),
                cancel_at_period_end = 0
            WHERE user_id = ?
            "#,
        )
        .bind(plan)
        .bind(&capture.order_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // Rolls back: no payment row may exist without its subscription
            // transition.
            return Err(ApiError::NotFound("Subscription not found".to_string()));
        }

        let payment_id = generate_payment_id();
        sqlx::query(
            r#"
            INSERT INTO payments
                (id, subscription_id, amount, currency, status, paypal_order_id, paypal_payer_id)
            SELECT ?, id, ?, ?, 'COMPLETED', ?, ?
            FROM subscriptions WHERE user_id = ?
            "#,
        )
        .bind(&payment_id)
        .bind(capture.amount)
        .bind(&capture.currency)
        .bind(&capture.order_id)
        .bind(capture.payer_id.as_deref())
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            plan = %plan.as_str(),
            order_id = %capture.order_id,
            amount = capture.amount,
            "Payment captured and entitlement granted"
        );

        let subscription = self
            .for_user(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Subscription not found".to_string()))?;
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?")
            .bind(&payment_id)
            .fetch_one(&self.db)
            .await?;

        Ok((subscription, payment))
    }

    /// Payment history for a user, newest first
    pub async fn payment_history(&self, user_id: &str) -> Result<Vec<Payment>, ApiError> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT p.* FROM payments p
            JOIN subscriptions s ON s.id = p.subscription_id
            WHERE s.user_id = ?
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(payments)
    }

    /// The most recent payments for a subscription (current-subscription view)
    pub async fn recent_payments(
        &self,
        subscription_id: &str,
        limit: i64,
    ) -> Result<Vec<Payment>, ApiError> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT * FROM payments
            WHERE subscription_id = ?
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(subscription_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        Ok(payments)
    }
}
