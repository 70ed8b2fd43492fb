//! List users query

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::response::{ApiResult, AppError};
use crate::auth::CurrentUser;
use crate::features::shared::pagination::{Paginated, PaginationParams};

/// A user with activity counts for the admin view
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub buyer_count: i64,
    pub history_count: i64,
}

/// Paginated account listing with per-user lead and history counts
pub async fn handle(
    pool: PgPool,
    user: &CurrentUser,
    pagination: PaginationParams,
) -> ApiResult<Paginated<UserSummary>> {
    user.require_admin()?;
    pagination.validate().map_err(AppError::validation)?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await?;

    let users = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.id, u.name, u.email, u.role, u.created_at,
               (SELECT COUNT(*) FROM buyers b WHERE b.owner_id = u.id) AS buyer_count,
               (SELECT COUNT(*) FROM buyer_history h WHERE h.changed_by = u.id) AS history_count
        FROM users u
        ORDER BY u.created_at ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(pagination.per_page())
    .bind(pagination.offset())
    .fetch_all(&pool)
    .await?;

    Ok(Paginated::new(
        users,
        pagination.page(),
        pagination.per_page(),
        total,
    ))
}
