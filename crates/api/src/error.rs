use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use domain::error::{OperationError, ResolutionFailure, SafetyViolation};
use persistence::db::UnknownRegion;
use persistence::repositories::ExecutionError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Recoverable minimum-age rejection; the caller can widen the filter.
    #[error(transparent)]
    Safety(#[from] SafetyViolation),

    /// A confirmation could not be tied to a prior preview.
    #[error(transparent)]
    Resolution(#[from] ResolutionFailure),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<JsonValue>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match &self {
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, "not_found".to_string(), msg.clone(), None)
            }
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error".to_string(),
                msg.clone(),
                None,
            ),
            ApiError::Safety(violation) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                violation.rule.code().to_string(),
                violation.to_string(),
                Some(serde_json::json!({
                    "required_days": violation.required_days,
                    "requested_days": violation.requested_days,
                    "cutoff": violation.cutoff,
                })),
            ),
            ApiError::Resolution(failure) => (
                StatusCode::CONFLICT,
                failure.code().to_string(),
                failure.to_string(),
                None,
            ),
            ApiError::Execution(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "execution_failed".to_string(),
                msg.clone(),
                None,
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".to_string(),
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable".to_string(),
                msg.clone(),
                None,
            ),
        };

        let body = ErrorBody {
            error: error_code,
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<OperationError> for ApiError {
    fn from(err: OperationError) -> Self {
        match err {
            OperationError::Safety(v) => ApiError::Safety(v),
            OperationError::Resolution(f) => ApiError::Resolution(f),
            OperationError::Validation(msg) => ApiError::Validation(msg),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<ExecutionError> for ApiError {
    fn from(err: ExecutionError) -> Self {
        ApiError::Execution(err.to_string())
    }
}

impl From<UnknownRegion> for ApiError {
    fn from(err: UnknownRegion) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<validator::ValidationError> for ApiError {
    fn from(err: validator::ValidationError) -> Self {
        let message = err
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.code.to_string());
        ApiError::Validation(message)
    }
}
