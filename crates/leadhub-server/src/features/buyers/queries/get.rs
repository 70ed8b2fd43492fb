//! Get single buyer query

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::features::buyers::types::BuyerResponse;
use crate::features::buyers::{fetch_buyer_authorized, BuyerAccessError};

/// Fetch one buyer, subject to the ownership rule
pub async fn handle(
    pool: PgPool,
    user: &CurrentUser,
    buyer_id: Uuid,
) -> Result<BuyerResponse, BuyerAccessError> {
    let record = fetch_buyer_authorized(&pool, user, buyer_id).await?;
    Ok(BuyerResponse::from(record))
}
