//! User administration feature
//!
//! Admin-only: list accounts with activity counts, change roles.

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::users_routes;
