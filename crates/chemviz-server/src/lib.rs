//! ChemVisualizer backend server
//!
//! Accepts CSV datasets of industrial equipment readings, aggregates them
//! per equipment type, keeps a bounded upload history, and renders a PDF
//! analytics report for each stored dataset.

pub mod api;
pub mod config;
pub mod db;
pub mod features;
pub mod ingest;
pub mod middleware;
pub mod models;
pub mod report;
