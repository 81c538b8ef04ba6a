//! Upload ingestion feature

pub mod commands;
pub mod routes;

pub use routes::upload_routes;
