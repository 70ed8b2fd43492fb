//! List buyers query
//!
//! Filtered, searched, paginated listing. Non-admin callers only ever see
//! their own leads; the owner predicate is part of the WHERE clause, not a
//! post-filter.

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use crate::auth::CurrentUser;
use crate::features::buyers::types::{
    BuyerRecord, BuyerResponse, City, LeadSource, LeadStatus, Timeline, BUYER_COLUMNS,
};
use crate::features::shared::pagination::{Paginated, PaginationParams};

/// Query parameters for the buyer list
#[derive(Debug, Default, Deserialize)]
pub struct ListBuyersQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Case-insensitive substring match over name, email, phone, notes, tags
    pub search: Option<String>,
    pub status: Option<String>,
    pub city: Option<String>,
    pub source: Option<String>,
    pub timeline: Option<String>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
}

#[derive(Debug, Error)]
pub enum ListBuyersError {
    #[error("{0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Validated filter values, with enum labels checked against the vocabularies
struct Filters {
    search: Option<String>,
    status: Option<LeadStatus>,
    city: Option<City>,
    source: Option<LeadSource>,
    timeline: Option<Timeline>,
    budget_min: Option<i64>,
    budget_max: Option<i64>,
}

impl ListBuyersQuery {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }

    fn filters(&self) -> Result<Filters, ListBuyersError> {
        fn parse_filter<T: std::str::FromStr<Err = String>>(
            value: &Option<String>,
        ) -> Result<Option<T>, ListBuyersError> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<T>().map_err(ListBuyersError::Validation))
                .transpose()
        }

        Ok(Filters {
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            status: parse_filter(&self.status)?,
            city: parse_filter(&self.city)?,
            source: parse_filter(&self.source)?,
            timeline: parse_filter(&self.timeline)?,
            budget_min: self.budget_min,
            budget_max: self.budget_max,
        })
    }
}

/// Handle the buyer list query
pub async fn handle(
    pool: PgPool,
    user: &CurrentUser,
    query: ListBuyersQuery,
) -> Result<Paginated<BuyerResponse>, ListBuyersError> {
    let pagination = query.pagination();
    pagination.validate().map_err(ListBuyersError::Validation)?;
    let filters = query.filters()?;

    enum Bind {
        Text(String),
        Int(i64),
    }

    // Conditions and binds grow together; placeholder $n is binds[n - 1]
    let mut conditions: Vec<String> = Vec::new();
    let mut binds: Vec<Bind> = Vec::new();

    if !user.is_admin() {
        binds.push(Bind::Text(user.id.to_string()));
        conditions.push(format!("owner_id = ${}::uuid", binds.len()));
    }

    if let Some(search) = &filters.search {
        binds.push(Bind::Text(format!("%{}%", search)));
        conditions.push(format!(
            "(full_name ILIKE ${n} OR email ILIKE ${n} OR phone ILIKE ${n} \
             OR notes ILIKE ${n} OR tags ILIKE ${n})",
            n = binds.len()
        ));
    }

    if let Some(status) = filters.status {
        binds.push(Bind::Text(status.as_str().to_string()));
        conditions.push(format!("status = ${}", binds.len()));
    }
    if let Some(city) = filters.city {
        binds.push(Bind::Text(city.as_str().to_string()));
        conditions.push(format!("city = ${}", binds.len()));
    }
    if let Some(source) = filters.source {
        binds.push(Bind::Text(source.as_str().to_string()));
        conditions.push(format!("source = ${}", binds.len()));
    }
    if let Some(timeline) = filters.timeline {
        binds.push(Bind::Text(timeline.as_str().to_string()));
        conditions.push(format!("timeline = ${}", binds.len()));
    }
    // Budget filters select leads whose range overlaps the requested range
    if let Some(min) = filters.budget_min {
        binds.push(Bind::Int(min));
        conditions.push(format!("budget_max >= ${}", binds.len()));
    }
    if let Some(max) = filters.budget_max {
        binds.push(Bind::Int(max));
        conditions.push(format!("budget_min <= ${}", binds.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM buyers{}", where_clause);
    let page_sql = format!(
        "SELECT {} FROM buyers{} ORDER BY updated_at DESC LIMIT ${} OFFSET ${}",
        BUYER_COLUMNS,
        where_clause,
        binds.len() + 1,
        binds.len() + 2
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut page_query = sqlx::query_as::<_, BuyerRecord>(&page_sql);

    for bind in &binds {
        match bind {
            Bind::Text(value) => {
                count_query = count_query.bind(value.clone());
                page_query = page_query.bind(value.clone());
            },
            Bind::Int(value) => {
                count_query = count_query.bind(*value);
                page_query = page_query.bind(*value);
            },
        }
    }

    let page = pagination.page();
    let per_page = pagination.per_page();
    page_query = page_query.bind(per_page).bind(pagination.offset());

    let total = count_query.fetch_one(&pool).await?;
    let records = page_query.fetch_all(&pool).await?;

    let items = records.into_iter().map(BuyerResponse::from).collect();
    Ok(Paginated::new(items, page, per_page, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_reject_unknown_labels() {
        let query = ListBuyersQuery {
            status: Some("Archived".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.filters(),
            Err(ListBuyersError::Validation(_))
        ));
    }

    #[test]
    fn test_filters_accept_known_labels() {
        let query = ListBuyersQuery {
            status: Some("Qualified".to_string()),
            city: Some("Mohali".to_string()),
            timeline: Some(">6m".to_string()),
            search: Some("  priya  ".to_string()),
            ..Default::default()
        };
        let filters = query.filters().unwrap();
        assert_eq!(filters.status, Some(LeadStatus::Qualified));
        assert_eq!(filters.city, Some(City::Mohali));
        assert_eq!(filters.timeline, Some(Timeline::MoreThanSixMonths));
        assert_eq!(filters.search.as_deref(), Some("priya"));
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let query = ListBuyersQuery {
            status: Some("  ".to_string()),
            search: Some(String::new()),
            ..Default::default()
        };
        let filters = query.filters().unwrap();
        assert!(filters.status.is_none());
        assert!(filters.search.is_none());
    }
}
