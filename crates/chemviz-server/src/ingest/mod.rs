//! Dataset ingestion
//!
//! Turns an uploaded CSV file into equipment rows ready for storage. Parsing
//! is tolerant of the header variants produced by the known exporters (unit
//! suffixes, underscores, mixed case) and of malformed data rows, which are
//! skipped and counted rather than failing the whole file.

pub mod parser;

pub use parser::{parse_equipment_csv, CsvError, ParsedDataset, ParsedRow};
