//! CSV export query
//!
//! Exports the caller's leads (or everything, for admins) joined with the
//! owning user, filtered the same way the list endpoint filters.

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use crate::auth::CurrentUser;
use crate::features::buyers::csv::{write_csv, BuyerExportRow};
use crate::features::buyers::types::{City, LeadSource, LeadStatus, Timeline};

#[derive(Debug, Default, Deserialize)]
pub struct ExportBuyersQuery {
    pub status: Option<String>,
    pub city: Option<String>,
    pub source: Option<String>,
    pub timeline: Option<String>,
}

#[derive(Debug, Error)]
pub enum ExportBuyersError {
    #[error("{0}")]
    Validation(String),
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn parse_filter<T: std::str::FromStr<Err = String>>(
    value: &Option<String>,
) -> Result<Option<T>, ExportBuyersError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().map_err(ExportBuyersError::Validation))
        .transpose()
}

/// Handle the export query, returning the CSV document as a string
pub async fn handle(
    pool: PgPool,
    user: &CurrentUser,
    query: ExportBuyersQuery,
) -> Result<String, ExportBuyersError> {
    let status = parse_filter::<LeadStatus>(&query.status)?;
    let city = parse_filter::<City>(&query.city)?;
    let source = parse_filter::<LeadSource>(&query.source)?;
    let timeline = parse_filter::<Timeline>(&query.timeline)?;

    let mut conditions: Vec<String> = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    if !user.is_admin() {
        binds.push(user.id.to_string());
        conditions.push(format!("b.owner_id = ${}::uuid", binds.len()));
    }
    if let Some(status) = status {
        binds.push(status.as_str().to_string());
        conditions.push(format!("b.status = ${}", binds.len()));
    }
    if let Some(city) = city {
        binds.push(city.as_str().to_string());
        conditions.push(format!("b.city = ${}", binds.len()));
    }
    if let Some(source) = source {
        binds.push(source.as_str().to_string());
        conditions.push(format!("b.source = ${}", binds.len()));
    }
    if let Some(timeline) = timeline {
        binds.push(timeline.as_str().to_string());
        conditions.push(format!("b.timeline = ${}", binds.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        r#"
        SELECT b.full_name, b.email, b.phone, b.city, b.property_type, b.bhk,
               b.purpose, b.budget_min, b.budget_max, b.timeline, b.source,
               b.status, b.tags, b.notes, b.created_at, b.updated_at,
               u.name AS owner_name, u.email AS owner_email
        FROM buyers b
        JOIN users u ON u.id = b.owner_id{}
        ORDER BY b.created_at DESC
        "#,
        where_clause
    );

    let mut rows_query = sqlx::query_as::<_, BuyerExportRow>(&sql);
    for bind in &binds {
        rows_query = rows_query.bind(bind.clone());
    }

    let rows = rows_query.fetch_all(&pool).await?;
    let exported = rows.len();

    let output = write_csv(rows)?;

    tracing::info!(user_id = %user.id, exported, "Exported buyer leads to CSV");

    Ok(output)
}
