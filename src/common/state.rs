// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::store::CredentialStore;
use crate::auth::token::TokenService;
use crate::billing::ledger::SubscriptionLedger;
use crate::services::{EmailService, GoogleService, OpenRouterService, PayPalService};

/// Application state containing database pool, services, and configuration
///
/// Constructed once in main and injected everywhere via Extension; no module
/// owns its own store client.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub tokens: TokenService,
    pub credentials: CredentialStore,
    pub ledger: SubscriptionLedger,
    pub paypal: Arc<PayPalService>,
    pub google: Arc<GoogleService>,
    pub openrouter: Arc<OpenRouterService>,
    pub email: Arc<EmailService>,
    /// Frontend origin used for OAuth redirects and payment return URLs
    pub app_url: String,
    /// Toggles the Secure flag on auth cookies
    pub production: bool,
}
