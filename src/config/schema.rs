//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the records service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Cross-origin policy for the browser front-end.
    pub cors: CorsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request and query limits.
    pub limits: LimitsConfig,

    /// Document store selection and connection settings.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// The single front-end origin allowed to call the API.
    pub allowed_origin: String,

    /// Whether browsers may send credentials (cookies, auth headers).
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "http://localhost:3000".to_string(),
            allow_credentials: true,
            max_age_secs: 60 * 60,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request and query limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Row count used by top-performers when the client gives none.
    pub default_top_limit: usize,

    /// Upper bound for a client supplied top-performers limit.
    pub max_top_limit: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024,
            default_top_limit: 5,
            max_top_limit: 100,
        }
    }
}

/// Which document store implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local, lost on exit.
    #[default]
    Memory,
    /// Process-local, mirrored to a JSON file after every write.
    File,
    /// Cloud Firestore over its REST API.
    Firestore,
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// Collection holding the student documents.
    pub collection: String,

    /// Data file used by the `file` backend.
    pub file_path: String,

    pub firestore: FirestoreConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            collection: "students".to_string(),
            file_path: "data/students.json".to_string(),
            firestore: FirestoreConfig::default(),
        }
    }
}

/// Cloud Firestore connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FirestoreConfig {
    /// Google Cloud project id.
    pub project_id: String,

    /// Database id within the project.
    pub database: String,

    /// REST API root.
    pub base_url: String,

    /// Web API key, sent as the `key` query parameter.
    pub api_key: Option<String>,

    /// OAuth2 access token, sent as a Bearer token.
    pub access_token: Option<String>,

    /// Per-call timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            database: "(default)".to_string(),
            base_url: "https://firestore.googleapis.com/v1".to_string(),
            api_key: None,
            access_token: None,
            request_timeout_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3001");
        assert_eq!(config.cors.allowed_origin, "http://localhost:3000");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.collection, "students");
        assert_eq!(config.limits.default_top_limit, 5);
    }

    #[test]
    fn test_partial_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [store]
            backend = "firestore"

            [store.firestore]
            project_id = "school-records"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.backend, StoreBackend::Firestore);
        assert_eq!(config.store.firestore.project_id, "school-records");
        assert_eq!(config.store.firestore.database, "(default)");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let parsed = toml::from_str::<AppConfig>("[store]\nbackend = \"postgres\"\n");
        assert!(parsed.is_err());
    }
}
