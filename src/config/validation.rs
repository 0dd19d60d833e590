//! Configuration validation.
//!
//! Serde handles syntax; this module checks values that parse but cannot
//! work (unparseable addresses, empty required settings, inverted limits).
//! All problems are reported at once rather than stopping at the first.

use std::fmt;
use std::net::SocketAddr;

use axum::http::HeaderValue;

use crate::config::schema::{AppConfig, StoreBackend};

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSetting {
    /// Dotted path of the offending key, e.g. `listener.bind_address`.
    pub key: &'static str,
    pub reason: String,
}

impl InvalidSetting {
    fn new(key: &'static str, reason: impl Into<String>) -> Self {
        Self {
            key,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for InvalidSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.reason)
    }
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<InvalidSetting>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(InvalidSetting::new(
            "listener.bind_address",
            format!("`{}` is not a socket address", config.listener.bind_address),
        ));
    }

    if config.cors.allowed_origin.is_empty()
        || HeaderValue::from_str(&config.cors.allowed_origin).is_err()
    {
        errors.push(InvalidSetting::new(
            "cors.allowed_origin",
            "must be a non-empty origin such as http://localhost:3000",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(InvalidSetting::new("timeouts.request_secs", "must be greater than 0"));
    }

    let limits = &config.limits;
    if limits.max_body_size == 0 {
        errors.push(InvalidSetting::new("limits.max_body_size", "must be greater than 0"));
    }
    if limits.default_top_limit == 0 || limits.default_top_limit > limits.max_top_limit {
        errors.push(InvalidSetting::new(
            "limits.default_top_limit",
            format!("must be between 1 and max_top_limit ({})", limits.max_top_limit),
        ));
    }

    let store = &config.store;
    if store.collection.is_empty() || store.collection.contains('/') {
        errors.push(InvalidSetting::new(
            "store.collection",
            "must be a non-empty name without '/'",
        ));
    }
    match store.backend {
        StoreBackend::Memory => {}
        StoreBackend::File => {
            if store.file_path.trim().is_empty() {
                errors.push(InvalidSetting::new(
                    "store.file_path",
                    "is required by the file backend",
                ));
            }
        }
        StoreBackend::Firestore => {
            if store.firestore.project_id.trim().is_empty() {
                errors.push(InvalidSetting::new(
                    "store.firestore.project_id",
                    "is required by the firestore backend",
                ));
            }
            if store.firestore.request_timeout_secs == 0 {
                errors.push(InvalidSetting::new(
                    "store.firestore.request_timeout_secs",
                    "must be greater than 0",
                ));
            }
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(InvalidSetting::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
