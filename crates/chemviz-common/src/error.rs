//! Error types shared across the ChemVisualizer workspace

use thiserror::Error;

/// Result type alias for ChemVisualizer operations
pub type Result<T> = std::result::Result<T, ChemVizError>;

/// Main shared error type
#[derive(Error, Debug)]
pub enum ChemVizError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Report rendering failed: {0}")]
    Render(String),
}

impl ChemVizError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Create a render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChemVizError::render("missing font");
        assert_eq!(err.to_string(), "Report rendering failed: missing font");

        let err = ChemVizError::config("bad port");
        assert!(err.to_string().contains("bad port"));
    }
}
