//! Metrics collection and exposition.
//!
//! # Metrics
//! - `records_http_requests_total` (counter): requests by method, route, status
//! - `records_http_request_duration_seconds` (histogram): latency by method, route
//! - `records_store_operations_total` (counter): store calls by operation, outcome
//! - `records_store_operation_duration_seconds` (histogram): store latency
//!
//! Recording without an installed exporter is a no-op, so tests and
//! metrics-disabled deployments pay nothing beyond the macro call.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "records_http_requests_total",
        "method" => method.to_owned(),
        "route" => route.to_owned(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "records_http_request_duration_seconds",
        "method" => method.to_owned(),
        "route" => route.to_owned()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_store_operation(operation: &'static str, ok: bool, start: Instant) {
    let outcome = if ok { "ok" } else { "error" };

    metrics::counter!(
        "records_store_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);

    metrics::histogram!(
        "records_store_operation_duration_seconds",
        "operation" => operation
    )
    .record(start.elapsed().as_secs_f64());
}
