//! Metrics collection and exposition.
//!
//! # Metrics
//! - `service_proxy_cache_lookups_total` (counter): URL cache lookups by result
//! - `service_proxy_resolutions_total` (counter): resolver calls by service, outcome
//! - `service_proxy_forwards_total` (counter): forwarded requests by service, status
//! - `service_proxy_forward_failures_total` (counter): transport failures by service
//! - `service_proxy_forward_duration_seconds` (histogram): backend latency
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is opt-in via config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    ::metrics::counter!("service_proxy_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_resolution(service: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    ::metrics::counter!(
        "service_proxy_resolutions_total",
        "service" => service.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_forward(service: &str, status: u16, start_time: Instant) {
    ::metrics::counter!(
        "service_proxy_forwards_total",
        "service" => service.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "service_proxy_forward_duration_seconds",
        "service" => service.to_string()
    )
    .record(start_time.elapsed().as_secs_f64());
}

pub fn record_forward_failure(service: &str) {
    ::metrics::counter!(
        "service_proxy_forward_failures_total",
        "service" => service.to_string()
    )
    .increment(1);
}
