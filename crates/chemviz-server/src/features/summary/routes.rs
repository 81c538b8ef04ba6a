//! Summary API routes
//!
//! `GET /api/summary?upload_id=<uuid>` - aggregated statistics for one
//! upload, defaulting to the most recent. 404 when the history is empty or
//! the id is unknown.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sqlx::SqlitePool;

use super::queries::{GetSummaryError, GetSummaryQuery};
use crate::api::response::ErrorBody;

pub fn summary_routes() -> Router<SqlitePool> {
    Router::new().route("/", get(get_summary))
}

#[tracing::instrument(skip(pool), fields(upload_id = ?query.upload_id))]
async fn get_summary(
    State(pool): State<SqlitePool>,
    Query(query): Query<GetSummaryQuery>,
) -> Result<Response, SummaryApiError> {
    let response = super::queries::get_summary::handle(pool, query).await?;

    tracing::debug!(
        upload_id = %response.upload_id,
        total_count = response.total_count,
        "Summary computed via API"
    );

    Ok((StatusCode::OK, Json(response)).into_response())
}

#[derive(Debug)]
struct SummaryApiError(GetSummaryError);

impl From<GetSummaryError> for SummaryApiError {
    fn from(err: GetSummaryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for SummaryApiError {
    fn into_response(self) -> Response {
        match self.0 {
            GetSummaryError::NoUploads | GetSummaryError::NotFound(_) => {
                let error = ErrorBody::new(self.0.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            GetSummaryError::Database(_) => {
                tracing::error!("Database error during summary computation: {}", self.0);
                let error = ErrorBody::new("A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}
