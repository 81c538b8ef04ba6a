//! Report API routes
//!
//! `GET /api/report/:id` - the analytics report for one upload as a PDF
//! attachment, regenerated on every call. 404 for an unknown id.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::queries::{RenderReportError, RenderReportQuery};
use crate::api::response::ErrorBody;

pub fn report_routes() -> Router<SqlitePool> {
    Router::new().route("/:id", get(download_report))
}

#[tracing::instrument(skip(pool), fields(upload_id = %id))]
async fn download_report(
    State(pool): State<SqlitePool>,
    Path(id): Path<Uuid>,
) -> Result<Response, ReportApiError> {
    let response = super::queries::render_report::handle(pool, RenderReportQuery { id }).await?;

    tracing::info!(
        upload_id = %id,
        bytes = response.content.len(),
        "Report downloaded via API"
    );

    let disposition = format!(
        "attachment; filename=\"{}\"",
        response.filename.replace('"', "")
    );
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        response.content,
    )
        .into_response())
}

#[derive(Debug)]
struct ReportApiError(RenderReportError);

impl From<RenderReportError> for ReportApiError {
    fn from(err: RenderReportError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ReportApiError {
    fn into_response(self) -> Response {
        match self.0 {
            RenderReportError::NotFound(ref id) => {
                let error = ErrorBody::new(format!("Upload '{}' not found", id));
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            RenderReportError::Database(_) => {
                tracing::error!("Database error during report generation: {}", self.0);
                let error = ErrorBody::new("A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            RenderReportError::Render(_) => {
                tracing::error!("Render error during report generation: {}", self.0);
                let error = ErrorBody::new("Report generation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReportApiError(RenderReportError::NotFound("abc".to_string()));
        assert!(err.0.to_string().contains("not found"));
    }

    #[test]
    fn test_routes_structure() {
        let router = report_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
