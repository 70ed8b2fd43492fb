//! History persistence

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ServerResult;

use super::models::{HistoryEntry, NewHistoryEntry};

/// Default number of entries returned per buyer
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Maximum number of entries returned per buyer
pub const MAX_HISTORY_LIMIT: i64 = 500;

/// Insert a single history entry
pub async fn insert_entry(pool: &PgPool, entry: NewHistoryEntry) -> ServerResult<HistoryEntry> {
    let row = sqlx::query_as::<_, HistoryEntry>(
        r#"
        INSERT INTO buyer_history (buyer_id, changed_by, action, diff)
        VALUES ($1, $2, $3, $4)
        RETURNING id, buyer_id, changed_by, action, diff, created_at
        "#,
    )
    .bind(entry.buyer_id)
    .bind(entry.changed_by)
    .bind(entry.action.as_str())
    .bind(entry.diff)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Record a history entry, swallowing failures
///
/// The mutation that produced the entry has already committed; losing a
/// trail entry must not surface as an error to the caller.
pub async fn record(pool: &PgPool, entry: NewHistoryEntry) {
    let buyer_id = entry.buyer_id;
    let action = entry.action;
    if let Err(err) = insert_entry(pool, entry).await {
        tracing::error!(
            buyer_id = %buyer_id,
            action = %action,
            error = %err,
            "Failed to record buyer history entry"
        );
    }
}

/// Most recent history entries for one buyer
pub async fn list_for_buyer(
    pool: &PgPool,
    buyer_id: Uuid,
    limit: Option<i64>,
) -> ServerResult<Vec<HistoryEntry>> {
    let limit = limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let rows = sqlx::query_as::<_, HistoryEntry>(
        r#"
        SELECT id, buyer_id, changed_by, action, diff, created_at
        FROM buyer_history
        WHERE buyer_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(buyer_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
