//! Response types and error handling for API endpoints
//!
//! Every failure is rendered as a JSON `ErrorResponse` carrying an error
//! code, a message, and an opaque reference token operators can decode.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scoutlink_common::{AppError, ErrorResponse};
use scoutlink_core::DomainError;
use scoutlink_service::ServiceError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

/// API error type for consistent error responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    App(#[from] AppError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    /// Create an invalid query error
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    fn into_app_error(self) -> AppError {
        match self {
            Self::App(e) => e,
            Self::Service(e) => e.into(),
            Self::Domain(e) => AppError::Domain(e),
            Self::Validation(e) => AppError::Validation(e.to_string()),
            Self::InvalidQuery(msg) => AppError::InvalidInput(msg),
            Self::Internal(e) => AppError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Capture validation field details before the conversion consumes them
        let details = if let Self::Validation(errors) = &self {
            serde_json::to_value(errors).ok()
        } else {
            None
        };

        let app_error = self.into_app_error();
        let status = StatusCode::from_u16(app_error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if app_error.is_server_error() {
            error!(error = ?app_error, "Server error occurred");
        }

        let mut body = ErrorResponse::from(&app_error);
        body.details = details;

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// Wrapper for successful JSON responses
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_expected_statuses() {
        let not_found = ApiError::Domain(DomainError::UserNotFound).into_app_error();
        assert_eq!(not_found.status_code(), 404);

        let conflict =
            ApiError::Domain(DomainError::UserCreationFailed("dup".into())).into_app_error();
        assert_eq!(conflict.status_code(), 409);

        let gateway =
            ApiError::Domain(DomainError::ExtranetQueryFailed("timeout".into())).into_app_error();
        assert_eq!(gateway.status_code(), 502);
    }

    #[test]
    fn test_invalid_query_is_bad_request() {
        let err = ApiError::invalid_query("page must be a number").into_app_error();
        assert_eq!(err.status_code(), 400);
    }
}
