use sqlx::SqlitePool;

use crate::models::Upload;

#[derive(Debug, thiserror::Error)]
pub enum ListUploadsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// List retained uploads, newest first
///
/// Returns the denormalized statistics stored at ingestion time; nothing is
/// recomputed here. History figures reflect values as of ingestion.
#[tracing::instrument(skip(pool))]
pub async fn handle(pool: SqlitePool) -> Result<Vec<Upload>, ListUploadsError> {
    let uploads = sqlx::query_as::<_, Upload>(
        r#"
        SELECT id, filename, upload_date, total_records, skipped_rows,
               avg_flowrate, avg_pressure, avg_temperature
        FROM uploads
        ORDER BY upload_date DESC, rowid DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(uploads)
}
