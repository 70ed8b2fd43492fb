//! HTTP routes for the admin dashboard

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use sqlx::PgPool;

use crate::api::response::{ApiResponse, AppError};
use crate::auth::CurrentUser;

use super::queries::summary;

/// Build the dashboard router
pub fn dashboard_routes() -> Router<PgPool> {
    Router::new().route("/", get(get_summary))
}

/// GET /dashboard
#[tracing::instrument(skip(pool, user), fields(user_id = %user.id))]
async fn get_summary(
    State(pool): State<PgPool>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let summary = summary::handle(pool, &user).await?;
    Ok(ApiResponse::success(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_builds() {
        let _router: Router<PgPool> = dashboard_routes();
    }
}
