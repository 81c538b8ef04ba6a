//! Feature modules implementing the ChemVisualizer API
//!
//! Each feature is a vertical slice with its own commands and/or queries and
//! route definitions:
//!
//! - **uploads**: CSV file ingestion (the only write path)
//! - **summary**: aggregated statistics for one upload
//! - **history**: listing and inspecting retained uploads
//! - **reports**: PDF report generation
//!
//! Commands and queries are plain `handle(pool, input)` functions with
//! per-operation error enums; `routes.rs` in each slice wires them to Axum
//! handlers and maps errors to HTTP responses.

pub mod history;
pub mod reports;
pub mod summary;
pub mod uploads;

use axum::Router;
use sqlx::SqlitePool;

use crate::config::IngestConfig;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// SQLite connection pool
    pub db: SqlitePool,
    /// Upload limits and history retention
    pub ingest: IngestConfig,
}

/// Build the combined feature router
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/upload", uploads::upload_routes().with_state(state.clone()))
        .nest("/summary", summary::summary_routes().with_state(state.db.clone()))
        .nest("/history", history::history_routes().with_state(state.db.clone()))
        .nest("/report", reports::report_routes().with_state(state.db.clone()))
}
