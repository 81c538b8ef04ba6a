//! History API routes
//!
//! - `GET /api/history` - retained uploads, newest first
//! - `GET /api/history/:id` - one upload with its equipment records

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::queries::{GetUploadError, GetUploadQuery, ListUploadsError};
use crate::api::response::ErrorBody;

pub fn history_routes() -> Router<SqlitePool> {
    Router::new()
        .route("/", get(list_history))
        .route("/:id", get(get_history_detail))
}

#[tracing::instrument(skip(pool))]
async fn list_history(State(pool): State<SqlitePool>) -> Result<Response, HistoryApiError> {
    let uploads = super::queries::list_uploads::handle(pool).await?;

    tracing::debug!(count = uploads.len(), "History listed via API");

    Ok((StatusCode::OK, Json(uploads)).into_response())
}

#[tracing::instrument(skip(pool), fields(upload_id = %id))]
async fn get_history_detail(
    State(pool): State<SqlitePool>,
    Path(id): Path<Uuid>,
) -> Result<Response, HistoryApiError> {
    let response = super::queries::get_upload::handle(pool, GetUploadQuery { id }).await?;

    tracing::debug!(
        upload_id = %response.upload.id,
        records = response.equipment.len(),
        "Upload detail retrieved via API"
    );

    Ok((StatusCode::OK, Json(response)).into_response())
}

#[derive(Debug)]
enum HistoryApiError {
    ListError(ListUploadsError),
    GetError(GetUploadError),
}

impl From<ListUploadsError> for HistoryApiError {
    fn from(err: ListUploadsError) -> Self {
        Self::ListError(err)
    }
}

impl From<GetUploadError> for HistoryApiError {
    fn from(err: GetUploadError) -> Self {
        Self::GetError(err)
    }
}

impl IntoResponse for HistoryApiError {
    fn into_response(self) -> Response {
        match self {
            HistoryApiError::GetError(GetUploadError::NotFound(ref id)) => {
                let error = ErrorBody::new(format!("Upload '{}' not found", id));
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            HistoryApiError::ListError(ListUploadsError::Database(_))
            | HistoryApiError::GetError(GetUploadError::Database(_)) => {
                tracing::error!("Database error during history access: {}", self);
                let error = ErrorBody::new("A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

impl std::fmt::Display for HistoryApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ListError(e) => write!(f, "{}", e),
            Self::GetError(e) => write!(f, "{}", e),
        }
    }
}
