//! Route handlers for the records API.
//!
//! Each handler validates its input, makes one service call and shapes the
//! result into an [`ApiResponse`]. Failures become [`ApiError`]s.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::config::LimitsConfig;
use crate::error::ApiError;
use crate::http::response::ApiResponse;
use crate::http::server::AppState;
use crate::records::{validate_search_term, validate_student, StudentInput, StudentRecord, ValidationError};

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct TopPerformersParams {
    /// Kept as text so a malformed value falls back to the default
    /// instead of rejecting the request.
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
}

pub async fn list_students(
    State(state): State<AppState>,
) -> ApiResult<ApiResponse<Vec<StudentRecord>>> {
    let students = state
        .students
        .list()
        .await
        .map_err(ApiError::store("Error fetching student data"))?;

    Ok(ApiResponse::data(students))
}

pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<StudentRecord>> {
    let student = state
        .students
        .get(&id)
        .await
        .map_err(ApiError::store("Error fetching student"))?
        .ok_or(ApiError::NotFound)?;

    Ok(ApiResponse::data(student))
}

pub async fn create_student(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, ApiResponse<StudentRecord>)> {
    let input = student_input(payload)?;
    let student = state
        .students
        .create(input)
        .await
        .map_err(ApiError::store("Error adding student"))?;

    tracing::info!(id = %student.id, "Student added");
    Ok((
        StatusCode::CREATED,
        ApiResponse::data(student).with_message("Student added successfully"),
    ))
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ApiResponse<StudentRecord>> {
    let input = student_input(payload)?;
    let student = state
        .students
        .update(&id, input)
        .await
        .map_err(ApiError::store("Error updating student"))?;

    tracing::info!(id = %student.id, "Student updated");
    Ok(ApiResponse::data(student).with_message("Student updated successfully"))
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    state
        .students
        .delete(&id)
        .await
        .map_err(ApiError::store("Error deleting student"))?;

    tracing::info!(id = %id, "Student deleted");
    Ok(ApiResponse::message("Student deleted successfully"))
}

pub async fn top_performers(
    State(state): State<AppState>,
    params: Result<Query<TopPerformersParams>, QueryRejection>,
) -> ApiResult<ApiResponse<Vec<StudentRecord>>> {
    // An unreadable query string is treated like a missing limit.
    let raw = match &params {
        Ok(Query(params)) => params.limit.as_deref(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Ignoring malformed top-performers query");
            None
        }
    };
    let limit = parse_limit(raw, &state.limits);
    let students = state
        .students
        .top_performers(limit)
        .await
        .map_err(ApiError::store("Error fetching top performers"))?;

    Ok(ApiResponse::data(students))
}

pub async fn search_students(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<ApiResponse<Vec<StudentRecord>>> {
    let Query(params) = params.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected search query");
        ValidationError::MalformedQuery
    })?;
    let term = validate_search_term(params.name.as_deref())?;
    let students = state
        .students
        .search(term)
        .await
        .map_err(ApiError::store("Error searching students"))?;

    Ok(ApiResponse::data(students))
}

pub async fn health() -> ApiResponse<()> {
    ApiResponse::message("ok")
}

pub async fn unknown_route() -> ApiError {
    ApiError::UnknownRoute
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn student_input(payload: Result<Json<Value>, JsonRejection>) -> Result<StudentInput, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected request body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ValidationError::MalformedBody.into()
        }
    })?;
    Ok(validate_student(&body)?)
}

/// Resolve the `limit` query parameter.
///
/// Missing, unparseable, non-finite or sub-1 values use the configured
/// default; fractions truncate; large values clamp to the maximum.
pub fn parse_limit(raw: Option<&str>, limits: &LimitsConfig) -> usize {
    raw.and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|limit| limit.is_finite() && *limit >= 1.0)
        .map(|limit| (limit.trunc() as usize).min(limits.max_top_limit))
        .unwrap_or(limits.default_top_limit)
}
