//! HTTP routes for user administration

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::response::{ApiResponse, AppError};
use crate::auth::CurrentUser;
use crate::features::shared::pagination::PaginationParams;

use super::commands::update_role::{self, UpdateRoleCommand};
use super::queries::list;

/// Build the user administration router
pub fn users_routes() -> Router<PgPool> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id/role", patch(update_user_role))
}

/// GET /users
#[tracing::instrument(skip(pool, user, pagination), fields(user_id = %user.id))]
async fn list_users(
    State(pool): State<PgPool>,
    user: CurrentUser,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = list::handle(pool, &user, pagination).await?;
    Ok(ApiResponse::success(page))
}

/// PATCH /users/:id/role
#[tracing::instrument(skip(pool, user, command), fields(admin_id = %user.id, target_id = %id))]
async fn update_user_role(
    State(pool): State<PgPool>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(command): Json<UpdateRoleCommand>,
) -> Result<impl IntoResponse, AppError> {
    let updated = update_role::handle(pool, &user, id, command).await?;
    Ok(ApiResponse::success(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_builds() {
        let _router: Router<PgPool> = users_routes();
    }
}
