//! Update user role command

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::response::{ApiResult, AppError};
use crate::auth::{CurrentUser, UserRole, UserRow};

#[derive(Debug, Deserialize)]
pub struct UpdateRoleCommand {
    pub role: UserRole,
}

/// Change another user's role
///
/// Admins cannot change their own role; demoting the last admin would
/// otherwise lock everyone out.
pub async fn handle(
    pool: PgPool,
    user: &CurrentUser,
    target_id: Uuid,
    command: UpdateRoleCommand,
) -> ApiResult<UserRow> {
    user.require_admin()?;

    if user.id == target_id {
        return Err(AppError::BadRequest(
            "You cannot change your own role".to_string(),
        ));
    }

    let updated = sqlx::query_as::<_, UserRow>(
        "UPDATE users SET role = $1 WHERE id = $2 RETURNING id, name, email, role, created_at",
    )
    .bind(command.role.as_str())
    .bind(target_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {} not found", target_id)))?;

    tracing::info!(
        admin_id = %user.id,
        user_id = %target_id,
        role = %command.role,
        "Changed user role"
    );

    Ok(updated)
}
