// Authentication module: credential store, token service, extractors, routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;
pub mod token;

#[cfg(test)]
mod tests;

pub use routes::auth_routes;
