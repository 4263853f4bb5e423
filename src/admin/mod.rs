// Admin console module

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::admin_routes;
