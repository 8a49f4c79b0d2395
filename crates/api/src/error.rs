//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::OrderError;
use saga::SagaError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
///
/// Every failure body is `{ "success": false, "message": ... }`.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Missing or unparseable identity headers.
    Unauthorized(&'static str),
    /// Authenticated, but the role does not permit the operation.
    Forbidden(&'static str),
    /// Saga or domain error.
    Saga(SagaError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.to_string()),
            ApiError::Saga(err) => saga_error_to_response(err),
        };

        let body = serde_json::json!({ "success": false, "message": message });
        (status, axum::Json(body)).into_response()
    }
}

fn saga_error_to_response(err: SagaError) -> (StatusCode, String) {
    match &err {
        SagaError::OrderNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        SagaError::Forbidden(_) => (StatusCode::FORBIDDEN, err.to_string()),
        SagaError::Domain(OrderError::IllegalTransition { .. }) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        SagaError::Domain(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        SagaError::Store(StoreError::Conflict { .. }) => (StatusCode::CONFLICT, err.to_string()),
        SagaError::Store(_) => {
            tracing::error!(error = %err, "storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::Saga(err)
    }
}
