//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status
//! - `proxy_request_duration_seconds` (histogram): latency by method, status
//! - `proxy_poll_total` (counter): finished polls by route, outcome
//! - `proxy_poll_attempts` (histogram): attempts per poll by route
//! - `proxy_screenshots_total` (counter): timeout screenshots by outcome
//!
//! Recording without an installed exporter is a no-op, so tests and
//! metrics-disabled runs pay nothing.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter with an HTTP scrape listener.
///
/// Must run inside the tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!(
        "proxy_requests_total",
        "method" => method.clone(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "proxy_request_duration_seconds",
        "method" => method,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_poll(route: &'static str, attempts: u32, timed_out: bool) {
    let outcome = if timed_out { "timeout" } else { "ready" };
    metrics::counter!("proxy_poll_total", "route" => route, "outcome" => outcome).increment(1);
    metrics::histogram!("proxy_poll_attempts", "route" => route).record(attempts as f64);
}

pub fn record_screenshot(saved: bool) {
    let outcome = if saved { "saved" } else { "failed" };
    metrics::counter!("proxy_screenshots_total", "outcome" => outcome).increment(1);
}
