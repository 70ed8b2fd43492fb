//! Feature slices
//!
//! Each slice owns its commands, queries, and routes:
//! - `buyers`: lead CRUD, filters, notes, status, history, CSV exchange
//! - `users`: admin account listing and role management
//! - `dashboard`: admin aggregates
//! - `shared`: pagination and validation helpers

use axum::Router;
use sqlx::PgPool;

pub mod buyers;
pub mod dashboard;
pub mod shared;
pub mod users;

/// Assemble every feature router under one tree
pub fn router(pool: PgPool) -> Router<()> {
    Router::new()
        .nest("/buyers", buyers::buyers_routes())
        .nest("/users", users::users_routes())
        .nest("/dashboard", dashboard::dashboard_routes())
        .with_state(pool)
}
