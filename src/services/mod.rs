// External provider services

pub mod email;
pub mod google;
pub mod openrouter;
pub mod paypal;
pub mod rate_limit;

pub use email::EmailService;
pub use google::GoogleService;
pub use openrouter::OpenRouterService;
pub use paypal::PayPalService;
pub use rate_limit::RateLimitService;
