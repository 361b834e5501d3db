//! Metrics collection and exposition.
//!
//! # Metrics
//! - `worker_requests_total` (counter): requests by route, status
//! - `worker_request_duration_seconds` (histogram): latency by route
//! - `worker_decode_strategy_total` (counter): decompression attempts by strategy, outcome
//! - `worker_release_lookup_total` (counter): draft lookups by outcome

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Initialize the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);

    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install Prometheus recorder"),
    }
}

/// Record a completed request.
pub fn record_request(route: &'static str, status: u16, start: Instant) {
    counter!("worker_requests_total", "route" => route, "status" => status.to_string()).increment(1);
    histogram!("worker_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record one decompression strategy attempt.
pub fn record_decode_strategy(strategy: &'static str, outcome: &'static str) {
    counter!("worker_decode_strategy_total", "strategy" => strategy, "outcome" => outcome).increment(1);
}

/// Record the outcome of a draft release lookup.
pub fn record_release_lookup(outcome: &'static str) {
    counter!("worker_release_lookup_total", "outcome" => outcome).increment(1);
}
