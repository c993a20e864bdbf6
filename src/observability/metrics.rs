//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define edge metrics (requests, latency, upstream calls, encoder pool)
//! - Expose a Prometheus-compatible scrape endpoint when configured
//!
//! # Metrics
//! - `edge_requests_total` (counter): requests by method, status
//! - `edge_request_duration_seconds` (histogram): time until the response
//!   body was fully sent
//! - `edge_upstream_requests_total` (counter): outbound calls by kind, status
//! - `edge_upstream_duration_seconds` (histogram): outbound latency by kind
//! - `edge_compressor_pool_idle` (gauge): idle gzip encoders
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Upstream transport failures are labelled `status="error"`

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a finished request.
pub fn record_request(method: &str, status: u16, elapsed: Duration) {
    counter!(
        "edge_requests_total",
        "method" => method.to_owned(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("edge_request_duration_seconds", "method" => method.to_owned()).record(elapsed.as_secs_f64());
}

/// Record an outbound call. `status` is `None` for transport failures.
pub fn record_upstream(kind: &'static str, status: Option<u16>, start: Instant) {
    let status = status.map_or_else(|| "error".to_owned(), |s| s.to_string());
    counter!("edge_upstream_requests_total", "kind" => kind, "status" => status).increment(1);
    histogram!("edge_upstream_duration_seconds", "kind" => kind).record(start.elapsed().as_secs_f64());
}

pub fn record_pool_idle(idle: usize) {
    gauge!("edge_compressor_pool_idle").set(idle as f64);
}
