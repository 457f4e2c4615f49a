//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_requests_total` (counter): completed requests by method, status
//! - `bridge_request_duration_seconds` (histogram): bridge latency
//! - `bridge_pending_dispatches` (gauge): requests awaiting an engine result
//! - `bridge_oversized_bodies_total` (counter): connections cut by the body ceiling
//! - `bridge_stale_results_total` (counter): engine results with no pending entry

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP exposition endpoint.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    if let Err(e) = builder.install() {
        tracing::error!(error = %e, "Failed to install metrics exporter");
        return;
    }

    describe_counter!("bridge_requests_total", "Completed requests by method and status");
    describe_histogram!(
        "bridge_request_duration_seconds",
        "Wall time from body read to response write"
    );
    describe_gauge!(
        "bridge_pending_dispatches",
        "Dispatched requests still awaiting an engine result"
    );
    describe_counter!(
        "bridge_oversized_bodies_total",
        "Connections aborted by the body ceiling"
    );
    describe_counter!(
        "bridge_stale_results_total",
        "Engine results discarded for lack of a pending entry"
    );

    tracing::info!(address = %addr, "Metrics exporter listening");
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "bridge_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("bridge_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Update the pending-dispatch gauge.
pub fn record_pending_depth(depth: usize) {
    gauge!("bridge_pending_dispatches").set(depth as f64);
}

/// Count a connection aborted by the body ceiling.
pub fn record_oversized_body() {
    counter!("bridge_oversized_bodies_total").increment(1);
}

/// Count a discarded stale result.
pub fn record_stale_result() {
    counter!("bridge_stale_results_total").increment(1);
}
