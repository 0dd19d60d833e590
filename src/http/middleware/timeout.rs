//! Request deadline middleware.

use std::time::Duration;

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Answer 408 in the JSON envelope once `limit` elapses. The handler
/// future is dropped at that point, cancelling any store call in flight.
pub async fn enforce_deadline(limit: Duration, request: Request, next: Next) -> Response {
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(timeout_secs = limit.as_secs_f64(), "Request timed out");
            ApiError::Timeout.into_response()
        }
    }
}
