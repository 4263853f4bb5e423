//! Billing data models: plans, subscriptions, payments

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Subscription tier, ordered by entitlement level.
///
/// Variant order defines the plan hierarchy used by `require_plan`:
/// FREE < BASIC < PREMIUM < ENTERPRISE.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    Free,
    Basic,
    Premium,
    Enterprise,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "FREE",
            Plan::Basic => "BASIC",
            Plan::Premium => "PREMIUM",
            Plan::Enterprise => "ENTERPRISE",
        }
    }

    pub fn parse(value: &str) -> Option<Plan> {
        match value {
            "FREE" => Some(Plan::Free),
            "BASIC" => Some(Plan::Basic),
            "PREMIUM" => Some(Plan::Premium),
            "ENTERPRISE" => Some(Plan::Enterprise),
            _ => None,
        }
    }

    /// Daily AI chat allowance; None means unlimited
    pub fn daily_chat_limit(&self) -> Option<i64> {
        match self {
            Plan::Free => Some(10),
            Plan::Basic => Some(100),
            Plan::Premium | Plan::Enterprise => None,
        }
    }

    pub fn monthly_price(&self) -> f64 {
        match self {
            Plan::Free => 0.0,
            Plan::Basic => 9.99,
            Plan::Premium => 29.99,
            Plan::Enterprise => 99.99,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    PastDue,
}

/// Subscription database model, exactly one row per user
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<String>,
    pub current_period_end: Option<String>,
    pub paypal_subscription_id: Option<String>,
    pub cancel_at_period_end: bool,
    pub created_at: Option<String>,
}

/// Payment database model, append-only
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Payment {
    pub id: String,
    pub subscription_id: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub paypal_order_id: String,
    pub paypal_payer_id: Option<String>,
    pub created_at: Option<String>,
}

/// Static plan catalog served to the pricing page
#[derive(Serialize, Debug, Clone)]
pub struct PlanInfo {
    pub id: Plan,
    pub name: &'static str,
    pub price: f64,
    pub interval: &'static str,
    pub features: &'static [&'static str],
    pub popular: bool,
}

pub fn plan_catalog() -> Vec<PlanInfo> {
    vec![
        PlanInfo {
            id: Plan::Free,
            name: "Free",
            price: Plan::Free.monthly_price(),
            interval: "month",
            features: &[
                "Basic AI features",
                "10 AI requests per day",
                "Email support",
                "Access to community",
            ],
            popular: false,
        },
        PlanInfo {
            id: Plan::Basic,
            name: "Basic",
            price: Plan::Basic.monthly_price(),
            interval: "month",
            features: &[
                "All Free features",
                "100 AI requests per day",
                "Priority email support",
                "Advanced analytics",
                "Custom branding",
            ],
            popular: false,
        },
        PlanInfo {
            id: Plan::Premium,
            name: "Premium",
            price: Plan::Premium.monthly_price(),
            interval: "month",
            features: &[
                "All Basic features",
                "Unlimited AI requests",
                "24/7 priority support",
                "Advanced AI models",
                "API access",
                "Team collaboration",
            ],
            popular: true,
        },
        PlanInfo {
            id: Plan::Enterprise,
            name: "Enterprise",
            price: Plan::Enterprise.monthly_price(),
            interval: "month",
            features: &[
                "All Premium features",
                "Dedicated account manager",
                "Custom AI training",
                "SLA guarantee",
                "Advanced security",
                "Unlimited storage",
            ],
            popular: false,
        },
    ]
}

/// Request payloads

#[derive(Deserialize, Debug)]
pub struct UpdatePlanPayload {
    pub plan: String,
}

#[derive(Deserialize, Debug)]
pub struct CreateOrderPayload {
    pub plan: String,
    pub amount: f64,
}

#[derive(Deserialize, Debug)]
pub struct CaptureOrderPayload {
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub plan: String,
}
