//! Shared wire-format error envelope
//!
//! Every service returns errors in this shape so clients can handle them
//! uniformly. Internal detail stays in logs; the envelope carries only a
//! generic title, a client-safe message, and a stable machine-readable code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable machine-readable error codes shared across services
pub mod error_codes {
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const MEDIA_NOT_FOUND: &str = "MEDIA_NOT_FOUND";
    pub const RANGE_NOT_SATISFIABLE: &str = "RANGE_NOT_SATISFIABLE";
    pub const NO_FORMAT_AVAILABLE: &str = "NO_FORMAT_AVAILABLE";
}

/// JSON error body returned to API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short human-readable title (e.g. "Not Found")
    pub error: String,
    /// Client-safe message; never contains internal detail
    pub message: String,
    /// HTTP status code mirrored into the body
    pub status: u16,
    /// Error category (e.g. "validation_error", "server_error")
    pub error_type: String,
    /// Stable machine-readable code from [`error_codes`]
    pub code: String,
    /// When the error was produced
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_round_trip() {
        let response = ErrorResponse::new(
            "Not Found",
            "Title not found",
            404,
            "not_found_error",
            error_codes::MEDIA_NOT_FOUND,
        );

        let json = serde_json::to_string(&response).unwrap();
        let parsed: ErrorResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status, 404);
        assert_eq!(parsed.code, "MEDIA_NOT_FOUND");
    }
}
