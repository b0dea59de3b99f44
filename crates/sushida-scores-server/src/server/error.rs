//! API error types and JSON response formatting.

use std::path::Path;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error};

use sushida_scores::{Error, StoreError};

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error details in the response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type that converts to HTTP responses.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Score not found error.
    pub fn score_not_found(id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "SCORE_NOT_FOUND",
            format!("Score '{}' not found", id),
        )
        .with_details(serde_json::json!({ "id": id }))
    }

    /// Invalid query parameter error.
    pub fn invalid_query(parameter: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_QUERY", message)
            .with_details(serde_json::json!({ "parameter": parameter }))
    }

    /// Malformed request body error.
    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_JSON", message)
    }

    /// No ingestion directory configured or given.
    pub fn ingest_not_configured() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "INGEST_NOT_CONFIGURED",
            "No ingestion directory is configured",
        )
    }

    /// Requested ingestion directory lies outside the configured one.
    pub fn ingest_directory_forbidden(directory: &Path) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "INGEST_DIRECTORY_FORBIDDEN",
            format!(
                "Directory '{}' is not inside the configured ingestion directory",
                directory.display()
            ),
        )
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Log server errors at error level, client errors at debug level
        if self.status.is_server_error() {
            error!(
                status = %self.status.as_u16(),
                code = %self.code,
                message = %self.message,
                "server error response"
            );
        } else if self.status.is_client_error() {
            debug!(
                status = %self.status.as_u16(),
                code = %self.code,
                message = %self.message,
                "client error response"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match &err {
            Error::DemoModeActive => Self::new(
                StatusCode::CONFLICT,
                "DEMO_MODE_ACTIVE",
                "Demo mode is active; turn it off before changing scores",
            ),
            Error::InvalidDate { input } => Self::new(
                StatusCode::BAD_REQUEST,
                "INVALID_DATE",
                format!("Invalid date '{}', expected YYYY-MM-DD", input),
            )
            .with_details(serde_json::json!({ "input": input })),
            Error::InvalidJson(msg) => Self::invalid_json(msg.clone()),
            Error::InvalidScore(msg) => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_SCORE", msg.clone())
            }
            Error::Store(StoreError::Corrupted { stored, computed }) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_CORRUPTED",
                format!(
                    "Stored scores failed checksum: stored {:08x}, computed {:08x}",
                    stored, computed
                ),
            ),
            Error::Store(StoreError::NotInitialized(path)) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_NOT_INITIALIZED",
                format!("Score store at '{}' is not initialized", path),
            ),
            _ => Self::internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_json(rejection.body_text())
    }
}
