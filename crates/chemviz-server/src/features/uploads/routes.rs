//! Upload API routes
//!
//! `POST /api/upload` - multipart form with a `file` field containing the
//! CSV. Responds 201 with the created upload, or 400 with `{"error": ...}`
//! on validation failure.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use super::commands::{IngestDatasetCommand, IngestDatasetError};
use crate::api::response::ErrorBody;
use crate::features::FeatureState;

pub fn upload_routes() -> Router<FeatureState> {
    Router::new().route("/", post(upload_dataset))
}

#[tracing::instrument(skip(state, multipart))]
async fn upload_dataset(
    State(state): State<FeatureState>,
    mut multipart: Multipart,
) -> Result<Response, UploadApiError> {
    let mut filename: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadApiError::BadMultipart(e.to_string()))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| UploadApiError::BadMultipart(e.to_string()))?;
            content = Some(data.to_vec());
        }
    }

    let content = content.ok_or(UploadApiError::MissingFileField)?;

    let command = IngestDatasetCommand {
        filename: filename.unwrap_or_else(|| "upload.csv".to_string()),
        content,
    };

    let response = super::commands::ingest::handle(state.db.clone(), &state.ingest, command).await?;

    tracing::info!(
        upload_id = %response.id,
        total_records = response.total_records,
        "Upload created via API"
    );

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[derive(Debug)]
enum UploadApiError {
    BadMultipart(String),
    MissingFileField,
    Ingest(IngestDatasetError),
}

impl From<IngestDatasetError> for UploadApiError {
    fn from(err: IngestDatasetError) -> Self {
        Self::Ingest(err)
    }
}

impl IntoResponse for UploadApiError {
    fn into_response(self) -> Response {
        match self {
            UploadApiError::BadMultipart(ref message) => {
                let error = ErrorBody::new(format!("Invalid multipart request: {}", message));
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            UploadApiError::MissingFileField => {
                let error = ErrorBody::new("No file field found in multipart data");
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            UploadApiError::Ingest(IngestDatasetError::FilenameRequired)
            | UploadApiError::Ingest(IngestDatasetError::FilenameLength)
            | UploadApiError::Ingest(IngestDatasetError::EmptyFile)
            | UploadApiError::Ingest(IngestDatasetError::FileTooLarge { .. })
            | UploadApiError::Ingest(IngestDatasetError::Csv(_))
            | UploadApiError::Ingest(IngestDatasetError::NoValidRows) => {
                let error = ErrorBody::new(self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            UploadApiError::Ingest(IngestDatasetError::Database(_)) => {
                tracing::error!("Database error during upload ingestion: {}", self);
                let error = ErrorBody::new("A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

impl std::fmt::Display for UploadApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadMultipart(message) => write!(f, "Invalid multipart request: {}", message),
            Self::MissingFileField => write!(f, "No file field found in multipart data"),
            Self::Ingest(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UploadApiError::Ingest(IngestDatasetError::NoValidRows);
        assert!(err.to_string().contains("No valid data rows"));
    }

    #[test]
    fn test_routes_structure() {
        let router = upload_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
