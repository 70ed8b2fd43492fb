//! CSV import command
//!
//! All rows are validated up front; a single invalid row rejects the whole
//! file. Inserted leads are owned by the importing user and each gets an
//! `imported` history entry.

use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use thiserror::Error;

use crate::auth::CurrentUser;
use crate::features::buyers::csv::{parse_batch, ImportError, NewBuyerRow};
use crate::history::{self, HistoryAction, NewHistoryEntry};

/// Outcome of a successful import
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
}

#[derive(Debug, Error)]
pub enum ImportCsvError {
    #[error(transparent)]
    Invalid(#[from] ImportError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Handle a CSV import
///
/// Inserts run inside one transaction so a database failure part-way
/// through leaves nothing behind.
pub async fn handle(
    pool: PgPool,
    user: &CurrentUser,
    data: &[u8],
) -> Result<ImportSummary, ImportCsvError> {
    let rows = parse_batch(data)?;
    let count = rows.len();

    let mut tx = pool.begin().await?;
    let mut buyer_ids = Vec::with_capacity(count);

    for row in rows {
        let buyer_id = insert_row(&mut tx, user, &row).await?;
        buyer_ids.push(buyer_id);
    }

    tx.commit().await?;

    for buyer_id in &buyer_ids {
        history::record(
            &pool,
            NewHistoryEntry::new(*buyer_id, user.id, HistoryAction::Imported)
                .with_diff(json!({ "source": "csv" })),
        )
        .await;
    }

    tracing::info!(user_id = %user.id, inserted = count, "Imported buyer leads from CSV");

    Ok(ImportSummary { inserted: count })
}

async fn insert_row(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user: &CurrentUser,
    row: &NewBuyerRow,
) -> Result<uuid::Uuid, sqlx::Error> {
    let id: uuid::Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO buyers (
            full_name, email, phone, city, property_type, bhk, purpose,
            budget_min, budget_max, timeline, source, status, tags, notes, owner_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING id
        "#,
    )
    .bind(&row.full_name)
    .bind(&row.email)
    .bind(&row.phone)
    .bind(row.city.as_str())
    .bind(row.property_type.as_str())
    .bind(row.bhk.map(|b| b.as_str()))
    .bind(row.purpose.as_str())
    .bind(row.budget_min)
    .bind(row.budget_max)
    .bind(row.timeline.as_str())
    .bind(row.source.as_str())
    .bind(row.status.as_str())
    .bind(&row.tags)
    .bind(&row.notes)
    .bind(user.id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(id)
}
