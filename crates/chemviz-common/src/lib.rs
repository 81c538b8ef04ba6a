//! ChemVisualizer Common Library
//!
//! Shared ambient code for the ChemVisualizer workspace:
//!
//! - **Error Handling**: the [`ChemVizError`] type and result alias
//! - **Logging**: centralized tracing configuration and initialization
//!
//! # Example
//!
//! ```no_run
//! use chemviz_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     tracing::info!("Application started");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{ChemVizError, Result};
