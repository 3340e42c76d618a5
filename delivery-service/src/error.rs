/// Error types for Delivery Service
///
/// This module defines all error types that can occur in the delivery-service.
/// Errors are converted to appropriate HTTP responses for API clients.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use error_types::ErrorResponse;
use std::fmt;

/// Result type for delivery-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Required parameter missing or malformed
    ValidationError(String),

    /// Invalid or missing access token
    Unauthorized(String),

    /// Unknown title, quality, segment, or chunk
    NotFound(String),

    /// No format in the table is servable for the request
    FormatUnavailable(String),

    /// Range header present but no valid range resolves
    RangeNotSatisfiable(String),

    /// Internal server error
    Internal(String),

    /// Bad request (malformed path or query part)
    BadRequest(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::FormatUnavailable(msg) => write!(f, "No format available: {}", msg),
            AppError::RangeNotSatisfiable(msg) => write!(f, "Range not satisfiable: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::FormatUnavailable(_) => StatusCode::NOT_FOUND,
            AppError::RangeNotSatisfiable(_) => StatusCode::RANGE_NOT_SATISFIABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error_type, code) = match self {
            AppError::ValidationError(_) => {
                ("validation_error", error_types::error_codes::VALIDATION_ERROR)
            }
            AppError::Unauthorized(_) => (
                "authentication_error",
                error_types::error_codes::INVALID_CREDENTIALS,
            ),
            AppError::NotFound(_) => {
                ("not_found_error", error_types::error_codes::MEDIA_NOT_FOUND)
            }
            AppError::FormatUnavailable(_) => (
                "not_found_error",
                error_types::error_codes::NO_FORMAT_AVAILABLE,
            ),
            AppError::RangeNotSatisfiable(_) => (
                "range_error",
                error_types::error_codes::RANGE_NOT_SATISFIABLE,
            ),
            AppError::Internal(_) => (
                "server_error",
                error_types::error_codes::INTERNAL_SERVER_ERROR,
            ),
            AppError::BadRequest(_) => ("validation_error", "INVALID_REQUEST"),
        };

        // Internal errors never leak detail to the client; everything else
        // carries its message through.
        let message = match self {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let response = ErrorResponse::new(
            match status {
                StatusCode::BAD_REQUEST => "Bad Request",
                StatusCode::UNAUTHORIZED => "Unauthorized",
                StatusCode::NOT_FOUND => "Not Found",
                StatusCode::RANGE_NOT_SATISFIABLE => "Range Not Satisfiable",
                StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
                _ => "Error",
            },
            &message,
            status.as_u16(),
            error_type,
            code,
        );

        HttpResponse::build(status).json(response)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::RangeNotSatisfiable("x".into()).status_code(),
            StatusCode::RANGE_NOT_SATISFIABLE
        );
        assert_eq!(
            AppError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_format_unavailable_carries_distinct_code() {
        let err = AppError::FormatUnavailable("no format for tag=9999".into());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let response = err.error_response();
        let body = actix_web::body::to_bytes(response.into_body())
            .await
            .unwrap();
        let parsed: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.code, error_types::error_codes::NO_FORMAT_AVAILABLE);
        assert_eq!(parsed.status, 404);
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let err = AppError::Internal("connection refused to 10.0.0.3".into());
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
