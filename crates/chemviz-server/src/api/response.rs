//! API response types
//!
//! The web client depends on two shapes: success responses are the plain
//! JSON documents described per endpoint, and every 4xx/5xx carries
//! `{"error": "..."}`. Callers distinguish conditions by status code, not by
//! inspecting the message text.

use serde::Serialize;

/// Standard error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    /// Create a new error body
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(ErrorBody::new("File is empty")).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "File is empty" }));
    }
}
