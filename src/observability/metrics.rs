//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, route
//! - `proxy_request_duration_seconds` (histogram): time to response head
//! - `proxy_failures_total` (counter): aborted requests by failure kind
//! - `proxy_filter_faults_total` (counter): recovered filter faults
//! - `proxy_stream_bytes_total` (counter): body bytes delivered to callers
//! - `proxy_stream_errors_total` (counter): truncated responses
//! - `proxy_settings_version` (gauge): latest published snapshot

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::FailureKind;
use crate::filter::Phase;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_failure(kind: FailureKind) {
    metrics::counter!("proxy_failures_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_filter_fault(filter: &str, phase: Phase) {
    metrics::counter!(
        "proxy_filter_faults_total",
        "filter" => filter.to_string(),
        "phase" => phase.as_str()
    )
    .increment(1);
}

pub fn record_stream(bytes: u64, completed: bool) {
    metrics::counter!("proxy_stream_bytes_total").increment(bytes);
    if !completed {
        metrics::counter!("proxy_stream_errors_total").increment(1);
    }
}

pub fn record_settings_published(version: u64) {
    metrics::gauge!("proxy_settings_version").set(version as f64);
}
