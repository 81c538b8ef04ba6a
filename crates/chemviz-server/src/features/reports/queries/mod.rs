pub mod render_report;

pub use render_report::{RenderReportError, RenderReportQuery, RenderReportResponse};
