//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One ingested file and its denormalized statistics.
///
/// Rows are append-only: written once at ingestion time, never updated.
/// The `avg_*` fields are the means over the accepted rows as of ingestion,
/// stored so history listings never have to recompute.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Upload {
    pub id: String,
    pub filename: String,
    pub upload_date: DateTime<Utc>,
    pub total_records: i64,
    pub skipped_rows: i64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
}

/// One row of equipment telemetry belonging to exactly one upload.
///
/// `id` is the autoincrement primary key; scanning by `id ASC` reproduces
/// the order rows appeared in the source file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EquipmentRecord {
    pub id: i64,
    pub upload_id: String,
    pub equipment_name: String,
    pub equipment_type: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}
