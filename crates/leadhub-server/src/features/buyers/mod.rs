//! Buyer lead management feature
//!
//! CRUD, filtered listing, status transitions, notes, per-buyer history,
//! and CSV import/export. All record access funnels through
//! [`fetch_buyer_authorized`] so the ownership rule lives in one place.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{ensure_owner_or_admin, CurrentUser};

pub mod commands;
pub mod csv;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::buyers_routes;
pub use types::{BuyerRecord, BuyerResponse};

/// Errors from authorized buyer lookups
#[derive(Debug, Error)]
pub enum BuyerAccessError {
    #[error("Buyer {0} not found")]
    NotFound(Uuid),
    #[error("You do not have permission to access this buyer")]
    Forbidden,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Fetch a buyer and enforce the ownership rule in one step
///
/// Owner or admin gets the record; anyone else gets `Forbidden`. A missing
/// record is `NotFound` regardless of caller, so existence leaks only to
/// authenticated users.
pub(crate) async fn fetch_buyer_authorized(
    pool: &PgPool,
    user: &CurrentUser,
    buyer_id: Uuid,
) -> Result<BuyerRecord, BuyerAccessError> {
    let record = sqlx::query_as::<_, BuyerRecord>(&format!(
        "SELECT {} FROM buyers WHERE id = $1",
        types::BUYER_COLUMNS
    ))
    .bind(buyer_id)
    .fetch_optional(pool)
    .await?
    .ok_or(BuyerAccessError::NotFound(buyer_id))?;

    ensure_owner_or_admin(user, record.owner_id)
        .map_err(|_| BuyerAccessError::Forbidden)?;

    Ok(record)
}
