//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define front controller metrics (requests, latency, blocks, misses)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `alpha_requests_total` (counter): requests by status
//! - `alpha_request_duration_seconds` (histogram): dispatch latency
//! - `alpha_requests_blocked_total` (counter): rejections by filter
//! - `alpha_route_misses_total` (counter): URIs with no matching route
//! - `alpha_bad_requests_total` (counter): bad requests recorded
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed (tests, CLI)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(status: u16, start: Instant) {
    metrics::counter!("alpha_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("alpha_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_blocked(filter: &'static str) {
    metrics::counter!("alpha_requests_blocked_total", "filter" => filter).increment(1);
}

pub fn record_route_miss() {
    metrics::counter!("alpha_route_misses_total").increment(1);
}

pub fn record_bad_request() {
    metrics::counter!("alpha_bad_requests_total").increment(1);
}
