//! Equipment CSV parser
//!
//! # File format
//!
//! Comma-separated values with one header row. Five columns are required:
//! equipment name, equipment type, flowrate, pressure, temperature. Headers
//! are matched case-insensitively after normalization (see
//! [`normalize_header`]), so `Equipment_ID`, `equipment name` and
//! `Flowrate (L/min)` all resolve. Column order is free and extra columns
//! are ignored.
//!
//! Data rows with a missing column or an unparseable numeric field are
//! skipped and counted, not treated as fatal.

use csv::ReaderBuilder;
use tracing::debug;

/// One accepted data row
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub equipment_name: String,
    pub equipment_type: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

/// Result of parsing one file
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDataset {
    /// Accepted rows in file order
    pub rows: Vec<ParsedRow>,
    /// Count of rows dropped for missing or unparseable fields
    pub skipped_rows: usize,
}

/// Parse failures that reject the whole file
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("File is empty")]
    Empty,

    #[error("Missing columns. Required: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("File is not parseable as CSV: {0}")]
    Malformed(#[from] csv::Error),
}

/// Indexes of the required columns within the header row
#[derive(Debug)]
struct ColumnMap {
    name: usize,
    equipment_type: usize,
    flowrate: usize,
    pressure: usize,
    temperature: usize,
}

impl ColumnMap {
    /// Resolve required columns from normalized headers
    fn resolve(headers: &[String]) -> Result<Self, CsvError> {
        let find = |aliases: &[&str]| {
            headers
                .iter()
                .position(|h| aliases.iter().any(|a| h == a))
        };

        let name = find(&["Equipment Name", "Equipment Id", "Equipment"]);
        let equipment_type = find(&["Type", "Equipment Type"]);
        let flowrate = find(&["Flowrate", "Flow Rate", "Flow"]);
        let pressure = find(&["Pressure", "Press"]);
        let temperature = find(&["Temperature", "Temp"]);

        let mut missing = Vec::new();
        if name.is_none() {
            missing.push("Equipment Name".to_string());
        }
        if equipment_type.is_none() {
            missing.push("Type".to_string());
        }
        if flowrate.is_none() {
            missing.push("Flowrate".to_string());
        }
        if pressure.is_none() {
            missing.push("Pressure".to_string());
        }
        if temperature.is_none() {
            missing.push("Temperature".to_string());
        }

        if !missing.is_empty() {
            return Err(CsvError::MissingColumns { missing });
        }

        // Unwraps are guarded by the missing-columns check above
        Ok(Self {
            name: name.unwrap_or_default(),
            equipment_type: equipment_type.unwrap_or_default(),
            flowrate: flowrate.unwrap_or_default(),
            pressure: pressure.unwrap_or_default(),
            temperature: temperature.unwrap_or_default(),
        })
    }
}

/// Normalize a raw header cell for matching
///
/// Drops a trailing unit suffix in parentheses, maps underscores to spaces
/// and title-cases the words: `"Flowrate (L/min)"` and `"equipment_id"`
/// become `"Flowrate"` and `"Equipment Id"`.
pub fn normalize_header(raw: &str) -> String {
    let without_units = raw.split('(').next().unwrap_or(raw);

    without_units
        .replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                },
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse an uploaded CSV file into equipment rows
///
/// Rows that are short a column or whose numeric fields do not parse as
/// floating point are skipped and counted in `skipped_rows`.
pub fn parse_equipment_csv(content: &[u8]) -> Result<ParsedDataset, CsvError> {
    if content.is_empty() {
        return Err(CsvError::Empty);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::Empty);
    }

    let columns = ColumnMap::resolve(&headers)?;

    let mut rows = Vec::new();
    let mut skipped_rows = 0usize;

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                debug!(error = %err, "Skipping unreadable CSV record");
                skipped_rows += 1;
                continue;
            },
        };

        match parse_record(&record, &columns) {
            Some(row) => rows.push(row),
            None => skipped_rows += 1,
        }
    }

    Ok(ParsedDataset { rows, skipped_rows })
}

/// Parse one data record; `None` means the row is skipped
fn parse_record(record: &csv::StringRecord, columns: &ColumnMap) -> Option<ParsedRow> {
    let field = |idx: usize| record.get(idx).map(str::trim);

    let equipment_name = field(columns.name)?.to_string();
    let equipment_type = field(columns.equipment_type)?.to_string();
    let flowrate: f64 = field(columns.flowrate)?.parse().ok()?;
    let pressure: f64 = field(columns.pressure)?.parse().ok()?;
    let temperature: f64 = field(columns.temperature)?.parse().ok()?;

    if equipment_type.is_empty() {
        return None;
    }

    Some(ParsedRow {
        equipment_name,
        equipment_type,
        flowrate,
        pressure,
        temperature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header_strips_units() {
        assert_eq!(normalize_header("Flowrate (L/min)"), "Flowrate");
        assert_eq!(normalize_header("Pressure (PSI)"), "Pressure");
    }

    #[test]
    fn test_normalize_header_underscores_and_case() {
        assert_eq!(normalize_header("Equipment_ID"), "Equipment Id");
        assert_eq!(normalize_header("equipment name"), "Equipment Name");
        assert_eq!(normalize_header("TEMPERATURE"), "Temperature");
    }

    #[test]
    fn test_parse_basic_file() {
        let csv = "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
                   R-101,Reactor,40,120,80\n\
                   P-201,Pump,20,50,30\n";
        let parsed = parse_equipment_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.skipped_rows, 0);
        assert_eq!(parsed.rows[0].equipment_name, "R-101");
        assert_eq!(parsed.rows[0].equipment_type, "Reactor");
        assert_eq!(parsed.rows[0].flowrate, 40.0);
        assert_eq!(parsed.rows[1].pressure, 50.0);
    }

    #[test]
    fn test_parse_with_header_aliases() {
        let csv = "Equipment_ID,Equipment_Type,Flowrate (L/min),Pressure (PSI),Temp (C)\n\
                   R-101,Reactor,40,120,80\n";
        let parsed = parse_equipment_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].equipment_type, "Reactor");
    }

    #[test]
    fn test_column_order_is_free() {
        let csv = "Temperature,Pressure,Flowrate,Type,Equipment Name\n\
                   80,120,40,Reactor,R-101\n";
        let parsed = parse_equipment_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows[0].flowrate, 40.0);
        assert_eq!(parsed.rows[0].temperature, 80.0);
        assert_eq!(parsed.rows[0].equipment_name, "R-101");
    }

    #[test]
    fn test_bad_rows_are_skipped_and_counted() {
        let csv = "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
                   R-101,Reactor,40,120,80\n\
                   R-102,Reactor,not-a-number,140,90\n\
                   P-201,Pump,20,50\n\
                   P-202,Pump,20,50,30\n";
        let parsed = parse_equipment_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.skipped_rows, 2);
    }

    #[test]
    fn test_missing_columns_are_named() {
        let csv = "Equipment Name,Type,Flowrate\nR-101,Reactor,40\n";
        let err = parse_equipment_csv(csv.as_bytes()).unwrap_err();
        match err {
            CsvError::MissingColumns { missing } => {
                assert_eq!(missing, vec!["Pressure".to_string(), "Temperature".to_string()]);
            },
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse_equipment_csv(b""), Err(CsvError::Empty)));
    }

    #[test]
    fn test_header_only_file_has_zero_rows() {
        let csv = "Equipment Name,Type,Flowrate,Pressure,Temperature\n";
        let parsed = parse_equipment_csv(csv.as_bytes()).unwrap();
        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.skipped_rows, 0);
    }

    #[test]
    fn test_whitespace_in_numeric_fields_is_tolerated() {
        let csv = "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
                   R-101,Reactor, 40.5 , 120.25 , 80\n";
        let parsed = parse_equipment_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows[0].flowrate, 40.5);
        assert_eq!(parsed.rows[0].pressure, 120.25);
    }

    #[test]
    fn test_empty_type_is_skipped() {
        let csv = "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
                   R-101,,40,120,80\n";
        let parsed = parse_equipment_csv(csv.as_bytes()).unwrap();
        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.skipped_rows, 1);
    }
}
