// Billing module: plans, subscription ledger, payment capture

pub mod handlers;
pub mod ledger;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

pub use routes::billing_routes;
