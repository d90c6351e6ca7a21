use crate::bootstrap::ListenError;
use crate::catalog::{CatalogServiceError, RepositoryError};
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Listen(ListenError),
    Catalog(CatalogServiceError),
    /// Request body that could not be read as the expected JSON document.
    InvalidBody(JsonRejection),
    /// The server was stopped by an unhandled panic.
    Panicked,
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Catalog(CatalogServiceError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "Invalid course data")
            }
            AppError::InvalidBody(_) => (StatusCode::BAD_REQUEST, "Invalid request body"),
            AppError::Catalog(CatalogServiceError::Repository(RepositoryError::NotFound)) => {
                (StatusCode::NOT_FOUND, "Course not found")
            }
            AppError::Catalog(CatalogServiceError::Repository(RepositoryError::Conflict)) => {
                (StatusCode::CONFLICT, "Course already exists")
            }
            AppError::Catalog(CatalogServiceError::Repository(RepositoryError::Unavailable(_)))
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Listen(_)
            | AppError::Panicked => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Listen(err) => write!(f, "listener error: {}", err),
            AppError::Catalog(err) => write!(f, "{}", err),
            AppError::InvalidBody(rejection) => write!(f, "{}", rejection.body_text()),
            AppError::Panicked => write!(f, "server stopped after an unhandled panic"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Listen(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::InvalidBody(rejection) => Some(rejection),
            AppError::Panicked => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "success": false,
            "message": message,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ListenError> for AppError {
    fn from(value: ListenError) -> Self {
        Self::Listen(value)
    }
}

impl From<CatalogServiceError> for AppError {
    fn from(value: CatalogServiceError) -> Self {
        Self::Catalog(value)
    }
}

impl From<JsonRejection> for AppError {
    fn from(value: JsonRejection) -> Self {
        Self::InvalidBody(value)
    }
}
