// AI module: chat proxy with per-plan daily limits

pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

pub use routes::ai_routes;
