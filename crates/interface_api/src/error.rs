//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain_debt::{DebtError, StoreError};
use serde::Serialize;
use thiserror::Error;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
            ApiError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone())
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DebtError> for ApiError {
    fn from(err: DebtError) -> Self {
        match err {
            DebtError::NotFound(msg) => ApiError::NotFound(msg),
            DebtError::InvalidAmount(msg) | DebtError::InvalidPayment(msg) => {
                ApiError::Validation(msg)
            }
            DebtError::OrderFrozen(_)
            | DebtError::OrderDeleted(_)
            | DebtError::AccountHasActiveOrders(_)
            | DebtError::DuplicateProduct(_) => ApiError::Conflict(err.to_string()),
            DebtError::Store(StoreError::NotFound(msg)) => ApiError::NotFound(msg),
            DebtError::Store(StoreError::Conflict(msg)) => {
                ApiError::Conflict(format!("concurrent update, retry: {msg}"))
            }
            DebtError::Store(StoreError::Backend(msg)) => ApiError::Internal(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_kernel::OrderId;

    #[test]
    fn test_domain_errors_map_to_status() {
        let err: ApiError = DebtError::not_found("order").into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = DebtError::InvalidPayment("too much".into()).into();
        assert!(matches!(err, ApiError::Validation(_)));

        let err: ApiError = DebtError::OrderDeleted(OrderId::new()).into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = DebtError::Store(StoreError::Conflict("v1".into())).into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }
}
