use sqlx::SqlitePool;
use uuid::Uuid;

use chemviz_common::ChemVizError;

use crate::models::{EquipmentRecord, Upload};
use crate::report;

/// Render the downloadable report for one upload
#[derive(Debug, Clone)]
pub struct RenderReportQuery {
    pub id: Uuid,
}

/// The rendered document and the filename to serve it under
#[derive(Debug, Clone)]
pub struct RenderReportResponse {
    pub filename: String,
    pub content: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderReportError {
    #[error("Upload '{0}' not found")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Render(#[from] ChemVizError),
}

/// Regenerate the report from current storage
///
/// Never cached: the document always reflects the records as stored now,
/// unlike history listings which serve ingestion-time figures.
#[tracing::instrument(skip(pool), fields(upload_id = %query.id))]
pub async fn handle(
    pool: SqlitePool,
    query: RenderReportQuery,
) -> Result<RenderReportResponse, RenderReportError> {
    let upload = sqlx::query_as::<_, Upload>(
        r#"
        SELECT id, filename, upload_date, total_records, skipped_rows,
               avg_flowrate, avg_pressure, avg_temperature
        FROM uploads
        WHERE id = ?
        "#,
    )
    .bind(query.id.to_string())
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| RenderReportError::NotFound(query.id.to_string()))?;

    let records = sqlx::query_as::<_, EquipmentRecord>(
        r#"
        SELECT id, upload_id, equipment_name, equipment_type,
               flowrate, pressure, temperature
        FROM equipment_records
        WHERE upload_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(&upload.id)
    .fetch_all(&pool)
    .await?;

    let filename = format!("Report_{}.pdf", upload.filename);
    let content = report::render_pdf(&upload, &records)?;

    tracing::debug!(bytes = content.len(), "Report rendered");

    Ok(RenderReportResponse { filename, content })
}
