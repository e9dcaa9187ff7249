//! Service-level error type.
//!
//! Domain errors from the registration pipeline are converted into `AppError`
//! at the service boundary, which in turn renders an `ApiResponse` envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::ApiResponse;

/// Result alias used by service handlers.
pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("secret resolution failed: {0}")]
    Secret(String),

    #[error("service not found: {0}")]
    ServiceNotFound(String),

    #[error("registration not found: {0}")]
    RegistrationNotFound(String),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    #[error("database query error: {0}")]
    DatabaseQuery(String),

    #[error("timed out: {0}")]
    Timeout(String),
}

impl AppError {
    /// Stable error code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Secret(_) => "SECRET_ERROR",
            AppError::ServiceNotFound(_) => "SERVICE_NOT_FOUND",
            AppError::RegistrationNotFound(_) => "REGISTRATION_NOT_FOUND",
            AppError::Registry(_) => "REGISTRY_ERROR",
            AppError::DatabaseConnection(_) => "DATABASE_CONNECTION_ERROR",
            AppError::DatabaseQuery(_) => "DATABASE_QUERY_ERROR",
            AppError::Timeout(_) => "TIMEOUT",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceNotFound(_) | AppError::RegistrationNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::Secret(_) => StatusCode::BAD_GATEWAY,
            AppError::Registry(_) | AppError::DatabaseConnection(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::DatabaseQuery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "Request rejected");
        }
        let body = ApiResponse::err(self.code(), self.to_string());
        (status, Json(body)).into_response()
    }
}
