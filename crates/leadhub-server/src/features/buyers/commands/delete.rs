//! Delete buyer command

use serde_json::json;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::features::buyers::{fetch_buyer_authorized, BuyerAccessError};
use crate::history::{self, HistoryAction, NewHistoryEntry};

#[derive(Debug, Error)]
pub enum DeleteBuyerError {
    #[error(transparent)]
    Access(#[from] BuyerAccessError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Handle buyer deletion
///
/// The `deleted` history entry outlives the record; buyer_history carries
/// no foreign key to buyers for exactly this reason.
pub async fn handle(
    pool: PgPool,
    user: &CurrentUser,
    buyer_id: Uuid,
) -> Result<(), DeleteBuyerError> {
    let record = fetch_buyer_authorized(&pool, user, buyer_id).await?;

    sqlx::query("DELETE FROM buyers WHERE id = $1")
        .bind(buyer_id)
        .execute(&pool)
        .await?;

    history::record(
        &pool,
        NewHistoryEntry::new(buyer_id, user.id, HistoryAction::Deleted).with_diff(json!({
            "full_name": record.full_name,
            "status": record.status,
        })),
    )
    .await;

    tracing::info!(buyer_id = %buyer_id, user_id = %user.id, "Deleted buyer lead");

    Ok(())
}
