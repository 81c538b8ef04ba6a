//! PDF report feature

pub mod queries;
pub mod routes;

pub use routes::report_routes;
