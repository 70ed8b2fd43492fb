//! HTTP routes for buyer leads

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::auth::CurrentUser;
use crate::history::HistoryEntry;

use super::commands::add_note::{self, AddNoteCommand, AddNoteError};
use super::commands::create::{self, CreateBuyerCommand, CreateBuyerError};
use super::commands::delete::{self, DeleteBuyerError};
use super::commands::import_csv::{self, ImportCsvError, ImportSummary};
use super::commands::update::{self, UpdateBuyerCommand, UpdateBuyerError};
use super::commands::update_status::{self, UpdateStatusCommand, UpdateStatusError};
use super::csv::ImportError;
use super::queries::export_csv::{self, ExportBuyersError, ExportBuyersQuery};
use super::queries::get as get_buyer;
use super::queries::history::{self as history_query, BuyerHistoryError, BuyerHistoryQuery};
use super::queries::list::{self, ListBuyersError, ListBuyersQuery};
use super::types::BuyerResponse;
use super::BuyerAccessError;

/// Build the buyer feature router
pub fn buyers_routes() -> Router<PgPool> {
    Router::new()
        .route("/", post(create_buyer).get(list_buyers))
        .route("/export", get(export_buyers))
        .route("/import", post(import_buyers))
        .route("/:id", get(get_buyer_by_id).put(update_buyer).delete(delete_buyer))
        .route("/:id/status", patch(update_buyer_status))
        .route("/:id/notes", patch(add_buyer_note))
        .route("/:id/history", get(get_buyer_history))
}

/// POST /buyers
#[tracing::instrument(skip(pool, user, command), fields(user_id = %user.id))]
async fn create_buyer(
    State(pool): State<PgPool>,
    user: CurrentUser,
    Json(command): Json<CreateBuyerCommand>,
) -> Result<impl IntoResponse, BuyerApiError> {
    let buyer = create::handle(pool, &user, command).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(buyer)))
}

/// GET /buyers
#[tracing::instrument(skip(pool, user, query), fields(user_id = %user.id))]
async fn list_buyers(
    State(pool): State<PgPool>,
    user: CurrentUser,
    Query(query): Query<ListBuyersQuery>,
) -> Result<impl IntoResponse, BuyerApiError> {
    let page = list::handle(pool, &user, query).await?;
    Ok(ApiResponse::success(page))
}

/// GET /buyers/:id
#[tracing::instrument(skip(pool, user), fields(user_id = %user.id, buyer_id = %id))]
async fn get_buyer_by_id(
    State(pool): State<PgPool>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<BuyerResponse>, BuyerApiError> {
    let buyer = get_buyer::handle(pool, &user, id).await?;
    Ok(ApiResponse::success(buyer))
}

/// PUT /buyers/:id
#[tracing::instrument(skip(pool, user, command), fields(user_id = %user.id, buyer_id = %id))]
async fn update_buyer(
    State(pool): State<PgPool>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(command): Json<UpdateBuyerCommand>,
) -> Result<ApiResponse<BuyerResponse>, BuyerApiError> {
    let buyer = update::handle(pool, &user, id, command).await?;
    Ok(ApiResponse::success(buyer))
}

/// DELETE /buyers/:id
#[tracing::instrument(skip(pool, user), fields(user_id = %user.id, buyer_id = %id))]
async fn delete_buyer(
    State(pool): State<PgPool>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BuyerApiError> {
    delete::handle(pool, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /buyers/:id/status
#[tracing::instrument(skip(pool, user, command), fields(user_id = %user.id, buyer_id = %id))]
async fn update_buyer_status(
    State(pool): State<PgPool>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(command): Json<UpdateStatusCommand>,
) -> Result<ApiResponse<BuyerResponse>, BuyerApiError> {
    let buyer = update_status::handle(pool, &user, id, command).await?;
    Ok(ApiResponse::success(buyer))
}

/// PATCH /buyers/:id/notes
#[tracing::instrument(skip(pool, user, command), fields(user_id = %user.id, buyer_id = %id))]
async fn add_buyer_note(
    State(pool): State<PgPool>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(command): Json<AddNoteCommand>,
) -> Result<ApiResponse<BuyerResponse>, BuyerApiError> {
    let buyer = add_note::handle(pool, &user, id, command).await?;
    Ok(ApiResponse::success(buyer))
}

/// GET /buyers/:id/history
#[tracing::instrument(skip(pool, user, query), fields(user_id = %user.id, buyer_id = %id))]
async fn get_buyer_history(
    State(pool): State<PgPool>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Query(query): Query<BuyerHistoryQuery>,
) -> Result<ApiResponse<Vec<HistoryEntry>>, BuyerApiError> {
    let entries = history_query::handle(pool, &user, id, query).await?;
    Ok(ApiResponse::success(entries))
}

/// GET /buyers/export
#[tracing::instrument(skip(pool, user, query), fields(user_id = %user.id))]
async fn export_buyers(
    State(pool): State<PgPool>,
    user: CurrentUser,
    Query(query): Query<ExportBuyersQuery>,
) -> Result<Response, BuyerApiError> {
    let body = export_csv::handle(pool, &user, query).await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"buyers.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}

/// POST /buyers/import
#[tracing::instrument(skip(pool, user, multipart), fields(user_id = %user.id))]
async fn import_buyers(
    State(pool): State<PgPool>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, ApiResponse<ImportSummary>), BuyerApiError> {
    let mut data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BuyerApiError::Upload(e.to_string()))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| BuyerApiError::Upload(e.to_string()))?;
            data = Some(bytes.to_vec());
            break;
        }
    }

    let data = data.ok_or(BuyerApiError::FileMissing)?;
    let summary = import_csv::handle(pool, &user, &data).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(summary)))
}

/// Unified error type for buyer endpoints
#[derive(Debug)]
pub enum BuyerApiError {
    Access(BuyerAccessError),
    Create(CreateBuyerError),
    Update(UpdateBuyerError),
    Delete(DeleteBuyerError),
    Status(UpdateStatusError),
    Note(AddNoteError),
    Import(ImportCsvError),
    List(ListBuyersError),
    Export(ExportBuyersError),
    History(BuyerHistoryError),
    Upload(String),
    FileMissing,
}

impl From<BuyerAccessError> for BuyerApiError {
    fn from(err: BuyerAccessError) -> Self {
        Self::Access(err)
    }
}

impl From<CreateBuyerError> for BuyerApiError {
    fn from(err: CreateBuyerError) -> Self {
        Self::Create(err)
    }
}

impl From<UpdateBuyerError> for BuyerApiError {
    fn from(err: UpdateBuyerError) -> Self {
        Self::Update(err)
    }
}

impl From<DeleteBuyerError> for BuyerApiError {
    fn from(err: DeleteBuyerError) -> Self {
        Self::Delete(err)
    }
}

impl From<UpdateStatusError> for BuyerApiError {
    fn from(err: UpdateStatusError) -> Self {
        Self::Status(err)
    }
}

impl From<AddNoteError> for BuyerApiError {
    fn from(err: AddNoteError) -> Self {
        Self::Note(err)
    }
}

impl From<ImportCsvError> for BuyerApiError {
    fn from(err: ImportCsvError) -> Self {
        Self::Import(err)
    }
}

impl From<ListBuyersError> for BuyerApiError {
    fn from(err: ListBuyersError) -> Self {
        Self::List(err)
    }
}

impl From<ExportBuyersError> for BuyerApiError {
    fn from(err: ExportBuyersError) -> Self {
        Self::Export(err)
    }
}

impl From<BuyerHistoryError> for BuyerApiError {
    fn from(err: BuyerHistoryError) -> Self {
        Self::History(err)
    }
}

fn access_response(err: &BuyerAccessError) -> (StatusCode, &'static str, String) {
    match err {
        BuyerAccessError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        BuyerAccessError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string()),
        BuyerAccessError::Database(db) => {
            tracing::error!("Database error: {}", db);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "A database error occurred".to_string(),
            )
        },
    }
}

fn database_response(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    tracing::error!("Database error: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "A database error occurred".to_string(),
    )
}

fn validation_response(message: &str) -> (StatusCode, &'static str, String) {
    (
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
        message.to_string(),
    )
}

impl IntoResponse for BuyerApiError {
    fn into_response(self) -> Response {
        // Import rejections carry per-row details; everything else is a
        // plain code + message
        if let BuyerApiError::Import(ImportCsvError::Invalid(ImportError::InvalidRows(failures))) =
            &self
        {
            let details = serde_json::to_value(failures).unwrap_or_default();
            let body = ErrorResponse::with_details(
                "VALIDATION_ERROR",
                format!("{} row(s) failed validation", failures.len()),
                details,
            );
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }

        let (status, code, message) = match &self {
            BuyerApiError::Access(err) => access_response(err),
            BuyerApiError::Create(CreateBuyerError::Validation(msg)) => validation_response(msg),
            BuyerApiError::Create(CreateBuyerError::Database(err)) => database_response(err),
            BuyerApiError::Update(UpdateBuyerError::Validation(msg)) => validation_response(msg),
            BuyerApiError::Update(UpdateBuyerError::Access(err)) => access_response(err),
            BuyerApiError::Update(UpdateBuyerError::Database(err)) => database_response(err),
            BuyerApiError::Delete(DeleteBuyerError::Access(err)) => access_response(err),
            BuyerApiError::Delete(DeleteBuyerError::Database(err)) => database_response(err),
            BuyerApiError::Status(UpdateStatusError::Access(err)) => access_response(err),
            BuyerApiError::Status(UpdateStatusError::Database(err)) => database_response(err),
            BuyerApiError::Note(AddNoteError::Validation(msg)) => validation_response(msg),
            BuyerApiError::Note(AddNoteError::Access(err)) => access_response(err),
            BuyerApiError::Note(AddNoteError::Database(err)) => database_response(err),
            BuyerApiError::Import(ImportCsvError::Invalid(err)) => validation_response(&err.to_string()),
            BuyerApiError::Import(ImportCsvError::Database(err)) => database_response(err),
            BuyerApiError::List(ListBuyersError::Validation(msg)) => validation_response(msg),
            BuyerApiError::List(ListBuyersError::Database(err)) => database_response(err),
            BuyerApiError::Export(ExportBuyersError::Validation(msg)) => validation_response(msg),
            BuyerApiError::Export(ExportBuyersError::Csv(err)) => {
                tracing::error!("CSV write error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Failed to generate export".to_string(),
                )
            },
            BuyerApiError::Export(ExportBuyersError::Database(err)) => database_response(err),
            BuyerApiError::History(BuyerHistoryError::Access(err)) => access_response(err),
            BuyerApiError::History(BuyerHistoryError::Server(err)) => {
                tracing::error!("History query error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "A database error occurred".to_string(),
                )
            },
            BuyerApiError::Upload(msg) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                format!("Invalid upload: {}", msg),
            ),
            BuyerApiError::FileMissing => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                "Multipart field 'file' is required".to_string(),
            ),
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_builds() {
        let _router: Router<PgPool> = buyers_routes();
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = BuyerApiError::Access(BuyerAccessError::NotFound(Uuid::new_v4()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        let err = BuyerApiError::Access(BuyerAccessError::Forbidden);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err = BuyerApiError::Create(CreateBuyerError::Validation(
            "Full name must be at least 2 characters".to_string(),
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_file_maps_to_400() {
        let response = BuyerApiError::FileMissing.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
