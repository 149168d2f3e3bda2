//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Record one sample per rendered response
//! - Optionally expose a Prometheus scrape endpoint
//!
//! # Metrics
//! - `stratum_requests_total` (counter): responses by method, status
//! - `stratum_request_duration_seconds` (histogram): time to render, by method
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder it is a no-op, so tests need no setup
//! - Status is a label, not part of the metric name

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "stratum_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "stratum_request_duration_seconds";

/// Record a finished request.
pub fn record_request(method: &str, status: u16, started: Instant) {
    metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(REQUEST_DURATION_SECONDS, "method" => method.to_string())
        .record(started.elapsed().as_secs_f64());
}

/// Install the Prometheus recorder and its HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    metrics::describe_counter!(REQUESTS_TOTAL, "Responses rendered, by method and status");
    metrics::describe_histogram!(
        REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Time spent running the pipeline and rendering"
    );
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}
