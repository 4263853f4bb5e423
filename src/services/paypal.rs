// src/services/paypal.rs
//! PayPal Orders API client: client-credentials auth, order creation and
//! capture.
//!
//! The access token is fetched per call, never cached across requests. Raw
//! provider error bodies are logged here and never surfaced to clients; the
//! route boundary maps every failure to a generic PaymentProviderError.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::billing::models::Plan;

const SANDBOX_API: &str = "https://api-m.sandbox.paypal.com";
const LIVE_API: &str = "https://api-m.paypal.com";

#[derive(Debug, Error)]
pub enum PayPalError {
    #[error("PayPal credentials not configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Provider returned an error status: {0}")]
    ProviderRejected(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result of a successful order creation
#[derive(Debug, Clone, Serialize)]
pub struct CreatedOrder {
    pub order_id: String,
    pub approval_url: Option<String>,
}

/// Result of an order capture attempt. `status` is the provider's verbatim
/// order status; only COMPLETED may transition the ledger.
#[derive(Debug, Clone)]
pub struct CapturedOrder {
    pub order_id: String,
    pub status: String,
    pub amount: f64,
    pub currency: String,
    pub payer_id: Option<String>,
}

impl CapturedOrder {
    pub fn is_completed(&self) -> bool {
        self.status == "COMPLETED"
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct OrderLink {
    rel: String,
    href: String,
}

#[derive(Deserialize)]
struct OrderResponse {
    id: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    links: Vec<OrderLink>,
    #[serde(default)]
    purchase_units: Vec<PurchaseUnit>,
    payer: Option<Payer>,
}

#[derive(Deserialize, Default)]
struct PurchaseUnit {
    amount: Option<Amount>,
    #[serde(default)]
    payments: Option<PurchaseUnitPayments>,
}

#[derive(Deserialize, Default)]
struct PurchaseUnitPayments {
    #[serde(default)]
    captures: Vec<CaptureRecord>,
}

#[derive(Deserialize)]
struct CaptureRecord {
    amount: Option<Amount>,
}

#[derive(Deserialize)]
struct Amount {
    value: String,
    currency_code: String,
}

#[derive(Deserialize)]
struct Payer {
    payer_id: Option<String>,
}

pub struct PayPalService {
    http: Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    base_url: String,
    app_url: String,
}

impl PayPalService {
    pub fn new(
        http: Client,
        client_id: Option<String>,
        client_secret: Option<String>,
        live_mode: bool,
        app_url: String,
    ) -> Self {
        Self {
            http,
            client_id,
            client_secret,
            base_url: if live_mode { LIVE_API } else { SANDBOX_API }.to_string(),
            app_url,
        }
    }

    pub fn from_env(http: Client, app_url: String) -> Self {
        let live_mode = env::var("PAYPAL_MODE").map(|m| m == "live").unwrap_or(false);
        Self::new(
            http,
            env::var("PAYPAL_CLIENT_ID").ok(),
            env::var("PAYPAL_CLIENT_SECRET").ok(),
            live_mode,
            app_url,
        )
    }

    /// Client-credentials grant. Fetched fresh for every order call; PayPal
    /// tokens are valid for hours but we deliberately do not cache them
    /// across requests.
    async fn access_token(&self) -> Result<String, PayPalError> {
        let (client_id, client_secret) = match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => (id, secret),
            _ => return Err(PayPalError::NotConfigured),
        };

        let basic = BASE64.encode(format!("{}:{}", client_id, client_secret));

        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .header("Authorization", format!("Basic {}", basic))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await
            .map_err(|e| PayPalError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(http_status = %status, body = %body, "PayPal token request rejected");
            return Err(PayPalError::ProviderRejected(status.as_u16()));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PayPalError::InvalidResponse(e.to_string()))?;

        debug!("Obtained PayPal access token");
        Ok(token.access_token)
    }

    /// Create an order for a plan purchase and return the approval URL for
    /// the client-side redirect.
    pub async fn create_order(&self, plan: Plan, amount: f64) -> Result<CreatedOrder, PayPalError> {
        let access_token = self.access_token().await?;

        let order_data = serde_json::json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": {
                    "currency_code": "USD",
                    "value": format!("{:.2}", amount),
                },
                "description": format!("Brainwave {} Plan Subscription", plan.as_str()),
            }],
            "application_context": {
                "return_url": format!("{}/payment/success", self.app_url),
                "cancel_url": format!("{}/payment/cancel", self.app_url),
                "brand_name": "Brainwave",
                "user_action": "PAY_NOW",
            },
        });

        let response = self
            .http
            .post(format!("{}/v2/checkout/orders", self.base_url))
            .bearer_auth(&access_token)
            .json(&order_data)
            .send()
            .await
            .map_err(|e| PayPalError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(http_status = %status, body = %body, "PayPal order creation rejected");
            return Err(PayPalError::ProviderRejected(status.as_u16()));
        }

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| PayPalError::InvalidResponse(e.to_string()))?;

        let approval_url = order
            .links
            .iter()
            .find(|link| link.rel == "approve")
            .map(|link| link.href.clone());

        info!(order_id = %order.id, plan = %plan.as_str(), "PayPal order created");

        Ok(CreatedOrder {
            order_id: order.id,
            approval_url,
        })
    }

    /// Capture a previously approved order. The caller must check
    /// `is_completed()` before granting any entitlement; approval may have
    /// been abandoned or the capture declined.
    pub async fn capture_order(&self, order_id: &str) -> Result<CapturedOrder, PayPalError> {
        let access_token = self.access_token().await?;

        let response = self
            .http
            .post(format!(
                "{}/v2/checkout/orders/{}/capture",
                self.base_url, order_id
            ))
            .bearer_auth(&access_token)
            .header("Content-Type", "application/json")
            .body("{}")
            .send()
            .await
            .map_err(|e| PayPalError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                http_status = %status,
                order_id = %order_id,
                body = %body,
                "PayPal capture rejected"
            );
            return Err(PayPalError::ProviderRejected(status.as_u16()));
        }

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| PayPalError::InvalidResponse(e.to_string()))?;

        // The captured amount lives under purchase_units[0].payments.captures[0]
        // in v2 responses; fall back to the unit-level amount when absent.
        let amount = order
            .purchase_units
            .first()
            .and_then(|unit| {
                unit.payments
                    .as_ref()
                    .and_then(|p| p.captures.first())
                    .and_then(|c| c.amount.as_ref())
                    .or(unit.amount.as_ref())
            })
            .ok_or_else(|| {
                PayPalError::InvalidResponse("capture response missing amount".to_string())
            })?;

        let value = amount
            .value
            .parse::<f64>()
            .map_err(|_| PayPalError::InvalidResponse("unparseable amount".to_string()))?;

        info!(
            order_id = %order.id,
            order_status = %order.status,
            amount = value,
            "PayPal capture response received"
        );

        Ok(CapturedOrder {
            order_id: order.id,
            status: order.status,
            amount: value,
            currency: amount.currency_code.clone(),
            payer_id: order.payer.and_then(|p| p.payer_id),
        })
    }
}
