//! Request payload validation.
//!
//! Bodies arrive as arbitrary JSON. [`validate_student`] is the only way to
//! obtain a [`StudentInput`], so nothing unvalidated reaches the store.

use serde_json::Value;
use thiserror::Error;

use crate::records::model::{Marks, StudentInput, MARKS, NAME};

/// A client-supplied value failed a precondition. Messages are user-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name and marks are required")]
    MissingFields,

    #[error("Name must be a non-empty string")]
    InvalidName,

    #[error("Marks must be a number between 0 and 100")]
    InvalidMarks,

    #[error("Search term is required")]
    MissingSearchTerm,

    #[error("Request body must be valid JSON")]
    MalformedBody,

    #[error("Query parameters are malformed")]
    MalformedQuery,
}

/// Validate a create/update payload.
///
/// - `name` and `marks` must be present and not `null`
/// - `name` must be a string with non-whitespace content; it is trimmed
/// - `marks` may be a JSON number or a numeric string and must be finite
///   and within `[0, 100]`
pub fn validate_student(payload: &Value) -> Result<StudentInput, ValidationError> {
    let present = |key: &str| payload.get(key).filter(|value| !value.is_null());

    let (Some(name), Some(marks)) = (present(NAME), present(MARKS)) else {
        return Err(ValidationError::MissingFields);
    };

    let name = name
        .as_str()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(ValidationError::InvalidName)?;

    let marks = coerce_number(marks)
        .and_then(Marks::new)
        .ok_or(ValidationError::InvalidMarks)?;

    Ok(StudentInput {
        name: name.to_owned(),
        marks,
    })
}

/// Validate the search term of a prefix search.
pub fn validate_search_term(term: Option<&str>) -> Result<&str, ValidationError> {
    term.filter(|term| !term.is_empty())
        .ok_or(ValidationError::MissingSearchTerm)
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
