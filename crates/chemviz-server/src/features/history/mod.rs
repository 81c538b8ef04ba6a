//! Upload history feature

pub mod queries;
pub mod routes;

pub use routes::history_routes;
