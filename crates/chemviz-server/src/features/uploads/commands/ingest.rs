use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::config::IngestConfig;
use crate::ingest::{parse_equipment_csv, CsvError, ParsedRow};

/// Ingest one uploaded CSV file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestDatasetCommand {
    pub filename: String,
    #[serde(skip)]
    pub content: Vec<u8>,
}

/// The created upload, as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestDatasetResponse {
    pub id: String,
    pub filename: String,
    pub upload_date: DateTime<Utc>,
    pub total_records: i64,
    pub skipped_rows: i64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestDatasetError {
    #[error("Filename is required and cannot be empty")]
    FilenameRequired,
    #[error("Filename must not exceed 255 characters")]
    FilenameLength,
    #[error("File is empty")]
    EmptyFile,
    #[error("File exceeds the maximum upload size of {limit} bytes")]
    FileTooLarge { limit: usize },
    #[error(transparent)]
    Csv(#[from] CsvError),
    #[error("No valid data rows found in file")]
    NoValidRows,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IngestDatasetCommand {
    pub fn validate(&self, max_upload_bytes: usize) -> Result<(), IngestDatasetError> {
        if self.filename.trim().is_empty() {
            return Err(IngestDatasetError::FilenameRequired);
        }
        if self.filename.len() > 255 {
            return Err(IngestDatasetError::FilenameLength);
        }
        if self.content.is_empty() {
            return Err(IngestDatasetError::EmptyFile);
        }
        if self.content.len() > max_upload_bytes {
            return Err(IngestDatasetError::FileTooLarge {
                limit: max_upload_bytes,
            });
        }
        Ok(())
    }
}

/// Parse, validate and persist one uploaded file
///
/// The upload row and all of its equipment records commit in a single
/// transaction, together with history pruning, so a partial ingestion is
/// never observable.
#[tracing::instrument(skip(pool, config, command), fields(filename = %command.filename))]
pub async fn handle(
    pool: SqlitePool,
    config: &IngestConfig,
    command: IngestDatasetCommand,
) -> Result<IngestDatasetResponse, IngestDatasetError> {
    command.validate(config.max_upload_bytes)?;

    let parsed = parse_equipment_csv(&command.content)?;
    if parsed.rows.is_empty() {
        return Err(IngestDatasetError::NoValidRows);
    }

    let id = Uuid::new_v4().to_string();
    let upload_date = Utc::now();
    let total_records = parsed.rows.len() as i64;
    let skipped_rows = parsed.skipped_rows as i64;
    let avg_flowrate = column_mean(&parsed.rows, |r| r.flowrate);
    let avg_pressure = column_mean(&parsed.rows, |r| r.pressure);
    let avg_temperature = column_mean(&parsed.rows, |r| r.temperature);

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO uploads
            (id, filename, upload_date, total_records, skipped_rows,
             avg_flowrate, avg_pressure, avg_temperature)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(command.filename.trim())
    .bind(upload_date)
    .bind(total_records)
    .bind(skipped_rows)
    .bind(avg_flowrate)
    .bind(avg_pressure)
    .bind(avg_temperature)
    .execute(&mut *tx)
    .await?;

    for row in &parsed.rows {
        sqlx::query(
            r#"
            INSERT INTO equipment_records
                (upload_id, equipment_name, equipment_type, flowrate, pressure, temperature)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&row.equipment_name)
        .bind(&row.equipment_type)
        .bind(row.flowrate)
        .bind(row.pressure)
        .bind(row.temperature)
        .execute(&mut *tx)
        .await?;
    }

    // Retention: only the newest N uploads are kept; deletes cascade to
    // equipment records. 0 disables pruning.
    if config.history_retention > 0 {
        let pruned = sqlx::query(
            r#"
            DELETE FROM uploads
            WHERE id NOT IN (
                SELECT id FROM uploads
                ORDER BY upload_date DESC, rowid DESC
                LIMIT ?
            )
            "#,
        )
        .bind(config.history_retention as i64)
        .execute(&mut *tx)
        .await?;

        if pruned.rows_affected() > 0 {
            tracing::info!(pruned = pruned.rows_affected(), "Pruned uploads past retention");
        }
    }

    tx.commit().await?;

    tracing::info!(
        upload_id = %id,
        total_records,
        skipped_rows,
        "Upload ingested"
    );

    Ok(IngestDatasetResponse {
        id,
        filename: command.filename.trim().to_string(),
        upload_date,
        total_records,
        skipped_rows,
        avg_flowrate,
        avg_pressure,
        avg_temperature,
    })
}

/// Mean of one numeric column over the accepted rows
fn column_mean(rows: &[ParsedRow], get: impl Fn(&ParsedRow) -> f64) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(get).sum::<f64>() / rows.len() as f64
}
