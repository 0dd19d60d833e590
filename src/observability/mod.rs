//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP layer and store calls produce:
//!     → logging.rs (structured log events, pretty or JSON)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID is recorded on every request span
//! - Store failure details reach the logs, never the client
//! - Metrics exporter is optional and off by default

pub mod logging;
pub mod metrics;
