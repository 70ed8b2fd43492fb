//! Buyer history query

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::ServerError;
use crate::features::buyers::{fetch_buyer_authorized, BuyerAccessError};
use crate::history::{self, HistoryEntry};

#[derive(Debug, Default, Deserialize)]
pub struct BuyerHistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Error)]
pub enum BuyerHistoryError {
    #[error(transparent)]
    Access(#[from] BuyerAccessError),
    #[error("Database error: {0}")]
    Server(#[from] ServerError),
}

/// Recent history entries for one buyer, newest first
///
/// Authorization goes through the buyer record itself; you can only read
/// the trail of a lead you could read.
pub async fn handle(
    pool: PgPool,
    user: &CurrentUser,
    buyer_id: Uuid,
    query: BuyerHistoryQuery,
) -> Result<Vec<HistoryEntry>, BuyerHistoryError> {
    fetch_buyer_authorized(&pool, user, buyer_id).await?;
    let entries = history::list_for_buyer(&pool, buyer_id, query.limit).await?;
    Ok(entries)
}
