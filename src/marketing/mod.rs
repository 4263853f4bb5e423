// Marketing module: contact form, waitlist, analytics, site content

pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

pub use routes::marketing_routes;
