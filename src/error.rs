use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::http::response::ApiResponse;
use crate::records::ValidationError;
use crate::store::StoreError;

/// Failure outcomes at the handler boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Student not found")]
    NotFound,

    #[error("Route not found")]
    UnknownRoute,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Request body is too large")]
    PayloadTooLarge,

    #[error("Request timed out")]
    Timeout,

    /// `context` is the client-facing message; `source` is only logged.
    #[error("{context}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Adapter for `map_err` that tags a store failure with its operation.
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |source| ApiError::Store { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::UnknownRoute => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn category(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "Validation error",
            ApiError::NotFound | ApiError::UnknownRoute => "Not found",
            ApiError::MethodNotAllowed => "Method not allowed",
            ApiError::PayloadTooLarge => "Payload too large",
            ApiError::Timeout => "Request timeout",
            ApiError::Store { .. } => "Database error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Store { context, source } = &self {
            tracing::error!(error = %source, "{context}");
        }

        let body = ApiResponse::failure(self.category(), self.to_string());
        (self.status(), body).into_response()
    }
}
