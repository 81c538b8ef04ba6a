use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{EquipmentRecord, Upload};

/// Fetch one retained upload with its equipment records
#[derive(Debug, Clone)]
pub struct GetUploadQuery {
    pub id: Uuid,
}

/// One upload plus its records in storage order
#[derive(Debug, Clone, Serialize)]
pub struct UploadDetailResponse {
    #[serde(flatten)]
    pub upload: Upload,
    pub equipment: Vec<EquipmentRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum GetUploadError {
    #[error("Upload '{0}' not found")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool), fields(upload_id = %query.id))]
pub async fn handle(
    pool: SqlitePool,
    query: GetUploadQuery,
) -> Result<UploadDetailResponse, GetUploadError> {
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
    .ok_or_else(|| GetUploadError::NotFound(query.id.to_string()))?;

    let equipment = sqlx::query_as::<_, EquipmentRecord>(
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

    Ok(UploadDetailResponse { upload, equipment })
}
