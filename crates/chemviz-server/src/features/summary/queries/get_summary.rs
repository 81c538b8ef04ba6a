use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{EquipmentRecord, Upload};

/// Summarize one upload, defaulting to the most recent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetSummaryQuery {
    pub upload_id: Option<Uuid>,
}

/// Per-equipment-type statistics within one upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAggregate {
    pub equipment_type: String,
    pub count: i64,
    pub avg_flow: f64,
    pub avg_press: f64,
    pub avg_temp: f64,
}

/// One temperature/pressure pair for correlation plotting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub temperature: f64,
    pub pressure: f64,
}

/// The aggregated view of one upload
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub upload_id: String,
    pub filename: String,
    pub total_count: i64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub type_distribution: Vec<TypeAggregate>,
    pub raw_data_points: Vec<DataPoint>,
}

#[derive(Debug, thiserror::Error)]
pub enum GetSummaryError {
    #[error("No uploads have been ingested yet")]
    NoUploads,
    #[error("Upload '{0}' not found")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Compute the summary for the requested upload
///
/// Reads only committed data; two calls with no intervening ingestion return
/// identical results.
#[tracing::instrument(skip(pool), fields(upload_id = ?query.upload_id))]
pub async fn handle(
    pool: SqlitePool,
    query: GetSummaryQuery,
) -> Result<SummaryResponse, GetSummaryError> {
    let upload = resolve_upload(&pool, &query).await?;

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

    let type_distribution = build_type_distribution(&records);
    let raw_data_points = records
        .iter()
        .map(|r| DataPoint {
            temperature: r.temperature,
            pressure: r.pressure,
        })
        .collect();

    // Global means are over all records, i.e. count-weighted with respect to
    // the per-type means. Not the unweighted mean of group averages.
    let total_count = records.len() as i64;
    let avg_flowrate = mean(records.iter().map(|r| r.flowrate));
    let avg_pressure = mean(records.iter().map(|r| r.pressure));
    let avg_temperature = mean(records.iter().map(|r| r.temperature));

    Ok(SummaryResponse {
        upload_id: upload.id,
        filename: upload.filename,
        total_count,
        avg_flowrate,
        avg_pressure,
        avg_temperature,
        type_distribution,
        raw_data_points,
    })
}

/// Look up the requested upload, or the latest when no id was given
async fn resolve_upload(
    pool: &SqlitePool,
    query: &GetSummaryQuery,
) -> Result<Upload, GetSummaryError> {
    match query.upload_id {
        Some(id) => sqlx::query_as::<_, Upload>(
            r#"
            SELECT id, filename, upload_date, total_records, skipped_rows,
                   avg_flowrate, avg_pressure, avg_temperature
            FROM uploads
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| GetSummaryError::NotFound(id.to_string())),
        None => sqlx::query_as::<_, Upload>(
            r#"
            SELECT id, filename, upload_date, total_records, skipped_rows,
                   avg_flowrate, avg_pressure, avg_temperature
            FROM uploads
            ORDER BY upload_date DESC, rowid DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(pool)
        .await?
        .ok_or(GetSummaryError::NoUploads),
    }
}

/// Group records by equipment type in first-seen order
///
/// Type keys compare case-sensitively. Scanning follows storage order, so
/// the grouping is deterministic and stable across repeated calls.
fn build_type_distribution(records: &[EquipmentRecord]) -> Vec<TypeAggregate> {
    struct Accumulator {
        equipment_type: String,
        count: i64,
        flow_sum: f64,
        press_sum: f64,
        temp_sum: f64,
    }

    let mut groups: Vec<Accumulator> = Vec::new();

    for record in records {
        match groups
            .iter_mut()
            .find(|g| g.equipment_type == record.equipment_type)
        {
            Some(group) => {
                group.count += 1;
                group.flow_sum += record.flowrate;
                group.press_sum += record.pressure;
                group.temp_sum += record.temperature;
            },
            None => groups.push(Accumulator {
                equipment_type: record.equipment_type.clone(),
                count: 1,
                flow_sum: record.flowrate,
                press_sum: record.pressure,
                temp_sum: record.temperature,
            }),
        }
    }

    groups
        .into_iter()
        .map(|g| TypeAggregate {
            equipment_type: g.equipment_type,
            avg_flow: g.flow_sum / g.count as f64,
            avg_press: g.press_sum / g.count as f64,
            avg_temp: g.temp_sum / g.count as f64,
            count: g.count,
        })
        .collect()
}

/// Arithmetic mean; 0 for an empty sequence
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0u64), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, equipment_type: &str, flow: f64, press: f64, temp: f64) -> EquipmentRecord {
        EquipmentRecord {
            id,
            upload_id: "u1".to_string(),
            equipment_name: format!("E-{:03}", id),
            equipment_type: equipment_type.to_string(),
            flowrate: flow,
            pressure: press,
            temperature: temp,
        }
    }

    #[test]
    fn test_distribution_example() {
        // Reactor(40,120,80), Reactor(60,140,90), Pump(20,50,30)
        let records = vec![
            record(1, "Reactor", 40.0, 120.0, 80.0),
            record(2, "Reactor", 60.0, 140.0, 90.0),
            record(3, "Pump", 20.0, 50.0, 30.0),
        ];

        let dist = build_type_distribution(&records);
        assert_eq!(
            dist,
            vec![
                TypeAggregate {
                    equipment_type: "Reactor".to_string(),
                    count: 2,
                    avg_flow: 50.0,
                    avg_press: 130.0,
                    avg_temp: 85.0,
                },
                TypeAggregate {
                    equipment_type: "Pump".to_string(),
                    count: 1,
                    avg_flow: 20.0,
                    avg_press: 50.0,
                    avg_temp: 30.0,
                },
            ]
        );

        let total: i64 = dist.iter().map(|t| t.count).sum();
        assert_eq!(total, records.len() as i64);

        // Global mean is the unweighted mean over records: (40+60+20)/3
        assert_eq!(mean(records.iter().map(|r| r.flowrate)), 40.0);
    }

    #[test]
    fn test_global_mean_is_count_weighted() {
        // Two types with different population sizes. The mean over all
        // records must differ from the mean of the per-type averages.
        let records = vec![
            record(1, "Reactor", 10.0, 0.0, 0.0),
            record(2, "Reactor", 10.0, 0.0, 0.0),
            record(3, "Reactor", 10.0, 0.0, 0.0),
            record(4, "Pump", 50.0, 0.0, 0.0),
        ];

        let dist = build_type_distribution(&records);
        let unweighted_of_groups =
            dist.iter().map(|t| t.avg_flow).sum::<f64>() / dist.len() as f64;
        let global = mean(records.iter().map(|r| r.flowrate));

        assert_eq!(unweighted_of_groups, 30.0);
        assert_eq!(global, 20.0);
        assert_ne!(global, unweighted_of_groups);
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let records = vec![
            record(1, "Pump", 1.0, 1.0, 1.0),
            record(2, "Reactor", 1.0, 1.0, 1.0),
            record(3, "Pump", 1.0, 1.0, 1.0),
            record(4, "Heat Exchanger", 1.0, 1.0, 1.0),
            record(5, "Reactor", 1.0, 1.0, 1.0),
        ];

        let types: Vec<_> = build_type_distribution(&records)
            .into_iter()
            .map(|t| t.equipment_type)
            .collect();
        assert_eq!(types, vec!["Pump", "Reactor", "Heat Exchanger"]);
    }

    #[test]
    fn test_type_keys_are_case_sensitive() {
        let records = vec![
            record(1, "Pump", 1.0, 1.0, 1.0),
            record(2, "pump", 1.0, 1.0, 1.0),
        ];
        assert_eq!(build_type_distribution(&records).len(), 2);
    }

    #[test]
    fn test_mean_of_empty_is_zero() {
        assert_eq!(mean(std::iter::empty()), 0.0);
    }
}
