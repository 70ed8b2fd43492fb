//! Update buyer status command
//!
//! The pipeline allows any status transition; the trail records each one.

use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::features::buyers::types::{BuyerRecord, BuyerResponse, LeadStatus, BUYER_COLUMNS};
use crate::features::buyers::{fetch_buyer_authorized, BuyerAccessError};
use crate::history::{self, HistoryAction, NewHistoryEntry};

#[derive(Debug, Deserialize)]
pub struct UpdateStatusCommand {
    pub status: LeadStatus,
}

#[derive(Debug, Error)]
pub enum UpdateStatusError {
    #[error(transparent)]
    Access(#[from] BuyerAccessError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// History entry for an accepted transition, including same-status ones
fn transition_entry(
    buyer_id: Uuid,
    changed_by: Uuid,
    from: &str,
    to: &str,
) -> NewHistoryEntry {
    NewHistoryEntry::new(buyer_id, changed_by, HistoryAction::StatusChanged).with_diff(json!({
        "status": { "from": from, "to": to }
    }))
}

/// Handle a status transition
///
/// Accepted transitions always update the row and always record history,
/// even when the new status equals the old one.
pub async fn handle(
    pool: PgPool,
    user: &CurrentUser,
    buyer_id: Uuid,
    command: UpdateStatusCommand,
) -> Result<BuyerResponse, UpdateStatusError> {
    let before = fetch_buyer_authorized(&pool, user, buyer_id).await?;
    let new_status = command.status.as_str();

    let after = sqlx::query_as::<_, BuyerRecord>(&format!(
        "UPDATE buyers SET status = $1, updated_at = now() WHERE id = $2 RETURNING {}",
        BUYER_COLUMNS
    ))
    .bind(new_status)
    .bind(buyer_id)
    .fetch_one(&pool)
    .await?;

    history::record(
        &pool,
        transition_entry(buyer_id, user.id, &before.status, new_status),
    )
    .await;

    tracing::info!(
        buyer_id = %buyer_id,
        user_id = %user.id,
        from = %before.status,
        to = %new_status,
        "Changed buyer status"
    );

    Ok(BuyerResponse::from(after))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_status_transition_still_yields_history_entry() {
        let buyer_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let entry = transition_entry(buyer_id, user_id, "New", "New");

        assert_eq!(entry.buyer_id, buyer_id);
        assert_eq!(entry.changed_by, user_id);
        assert_eq!(entry.action, HistoryAction::StatusChanged);
        let diff = entry.diff.unwrap();
        assert_eq!(diff["status"]["from"], "New");
        assert_eq!(diff["status"]["to"], "New");
    }

    #[test]
    fn test_transition_entry_records_endpoints() {
        let entry = transition_entry(Uuid::new_v4(), Uuid::new_v4(), "New", "Qualified");
        let diff = entry.diff.unwrap();
        assert_eq!(diff["status"]["from"], "New");
        assert_eq!(diff["status"]["to"], "Qualified");
    }
}
