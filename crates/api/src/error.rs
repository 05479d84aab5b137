//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side failures to
//! Sentry before answering with the error envelope. All route handlers return
//! `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::response::{ApiResponse, ErrorBody};
use crate::validation::FieldError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more input fields are invalid.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// The request body could not be parsed.
    #[error("{0}")]
    InvalidBody(String),

    /// Semantically empty or otherwise unusable request.
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found (or soft-deleted).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Storage constraint violation.
    #[error("{0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// A dependency the server needs is unreachable.
    #[error("{0}")]
    Unavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidBody(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) | Self::Database(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::Database(RepositoryError::Conflict(_)) => {
                StatusCode::CONFLICT
            }
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code carried in the envelope.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidBody(_) => "VALIDATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) | Self::Database(RepositoryError::NotFound) => "NOT_FOUND",
            Self::Conflict(_) | Self::Database(RepositoryError::Conflict(_)) => "CONFLICT",
            Self::Unavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Database(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let code = self.code();

        // Don't expose internal error details to clients
        let (message, details) = match self {
            Self::Validation(details) => ("Validation failed".to_string(), Some(details)),
            Self::Database(RepositoryError::Conflict(message)) => (message, None),
            Self::Database(RepositoryError::NotFound) => ("Resource not found".to_string(), None),
            Self::Database(_) | Self::Internal(_) => ("Internal server error".to_string(), None),
            other => (other.to_string(), None),
        };

        ApiResponse::failure(
            status,
            ErrorBody {
                message,
                code,
                details,
            },
        )
        .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Product");
        assert_eq!(err.to_string(), "Product not found");

        let err = AppError::BadRequest("No fields to update".to_string());
        assert_eq!(err.to_string(), "No fields to update");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::Validation(vec![FieldError::new("name", "is required")])),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::NotFound("Store")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict(
                "store does not exist".to_string()
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Unavailable("database".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::Validation(Vec::new()).code(), "VALIDATION_ERROR");
        assert_eq!(AppError::InvalidBody("bad".into()).code(), "VALIDATION_ERROR");
        assert_eq!(AppError::BadRequest("empty".into()).code(), "BAD_REQUEST");
        assert_eq!(AppError::NotFound("Store").code(), "NOT_FOUND");
        assert_eq!(AppError::Conflict("dup".into()).code(), "CONFLICT");
        assert_eq!(
            AppError::Database(RepositoryError::DataCorruption("x".into())).code(),
            "INTERNAL_ERROR"
        );
    }

    async fn body_json(err: AppError) -> serde_json::Value {
        let body = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_validation_envelope_lists_fields() {
        let json = body_json(AppError::Validation(vec![
            FieldError::new("name", "must not be empty"),
            FieldError::new("price", "must be a positive number"),
        ]))
        .await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["message"], "Validation failed");
        assert_eq!(json["error"]["details"][1]["field"], "price");
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let json = body_json(AppError::Database(RepositoryError::DataCorruption(
            "negative row count: -1".into(),
        )))
        .await;
        assert_eq!(json["error"]["message"], "Internal server error");
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        assert!(json["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_conflict_message_is_passed_through() {
        let json = body_json(AppError::Database(RepositoryError::Conflict(
            "store 00000000-0000-0000-0000-000000000000 does not exist".into(),
        )))
        .await;
        assert_eq!(json["error"]["code"], "CONFLICT");
        assert!(
            json["error"]["message"]
                .as_str()
                .unwrap()
                .contains("does not exist")
        );
    }
}
