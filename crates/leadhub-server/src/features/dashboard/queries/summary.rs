//! Dashboard summary query
//!
//! Aggregates for the admin landing page: totals, per-label breakdowns,
//! and the most recent leads and history activity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::response::ApiResult;
use crate::auth::CurrentUser;

/// Number of recent leads shown on the dashboard
const RECENT_BUYERS: i64 = 5;

/// Number of recent history entries shown on the dashboard
const RECENT_ACTIVITY: i64 = 10;

/// One label with its lead count
#[derive(Debug, Serialize)]
pub struct CountBucket {
    pub value: String,
    pub count: i64,
}

/// A recently created lead with its owner
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct RecentBuyer {
    pub id: Uuid,
    pub full_name: String,
    pub city: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub owner_email: String,
}

/// A recent history entry with buyer and actor context
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct RecentActivity {
    pub buyer_id: Uuid,
    pub buyer_name: String,
    pub action: String,
    pub changed_by_email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_buyers: i64,
    pub total_users: i64,
    pub by_status: Vec<CountBucket>,
    pub by_source: Vec<CountBucket>,
    pub by_city: Vec<CountBucket>,
    pub recent_buyers: Vec<RecentBuyer>,
    pub recent_activity: Vec<RecentActivity>,
}

async fn count_by(pool: &PgPool, column: &str) -> Result<Vec<CountBucket>, sqlx::Error> {
    // `column` is a compile-time constant at every call site, never input
    let sql = format!(
        "SELECT {col}, COUNT(*) FROM buyers GROUP BY {col} ORDER BY COUNT(*) DESC",
        col = column
    );
    let rows = sqlx::query_as::<_, (String, i64)>(&sql).fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .map(|(value, count)| CountBucket { value, count })
        .collect())
}

/// Build the dashboard summary
pub async fn handle(pool: PgPool, user: &CurrentUser) -> ApiResult<DashboardSummary> {
    user.require_admin()?;

    let total_buyers = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM buyers");
    let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users");

    let recent_buyers = sqlx::query_as::<_, RecentBuyer>(
        r#"
        SELECT b.id, b.full_name, b.city, b.status, b.created_at,
               u.email AS owner_email
        FROM buyers b
        JOIN users u ON u.id = b.owner_id
        ORDER BY b.created_at DESC
        LIMIT $1
        "#,
    )
    .bind(RECENT_BUYERS);

    let recent_activity = sqlx::query_as::<_, RecentActivity>(
        r#"
        SELECT h.buyer_id,
               COALESCE(b.full_name, '(deleted)') AS buyer_name,
               h.action,
               u.email AS changed_by_email,
               h.created_at
        FROM buyer_history h
        LEFT JOIN buyers b ON b.id = h.buyer_id
        JOIN users u ON u.id = h.changed_by
        ORDER BY h.created_at DESC
        LIMIT $1
        "#,
    )
    .bind(RECENT_ACTIVITY);

    let (total_buyers, total_users, by_status, by_source, by_city, recent_buyers, recent_activity) =
        tokio::try_join!(
            total_buyers.fetch_one(&pool),
            total_users.fetch_one(&pool),
            count_by(&pool, "status"),
            count_by(&pool, "source"),
            count_by(&pool, "city"),
            recent_buyers.fetch_all(&pool),
            recent_activity.fetch_all(&pool),
        )?;

    Ok(DashboardSummary {
        total_buyers,
        total_users,
        by_status,
        by_source,
        by_city,
        recent_buyers,
        recent_activity,
    })
}
