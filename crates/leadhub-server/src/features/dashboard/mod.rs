//! Admin dashboard feature

pub mod queries;
pub mod routes;

pub use routes::dashboard_routes;
