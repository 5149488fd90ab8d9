//! Metrics collection and exposition.
//!
//! # Metrics
//! - `real_ip_resolutions_total` (counter): resolved requests by outcome
//!   (`untrusted_peer`, `fully_trusted`, `truncated`)
//! - `real_ip_resolution_errors_total` (counter): rejected requests by kind
//!   (`malformed_peer_address`, `unparsable_ip`)
//! - `real_ip_upstream_requests_total` (counter): forwarded requests by status
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_resolution(outcome: &'static str) {
    metrics::counter!("real_ip_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_resolution_error(kind: &'static str) {
    metrics::counter!("real_ip_resolution_errors_total", "kind" => kind).increment(1);
}

pub fn record_upstream(status: u16) {
    metrics::counter!("real_ip_upstream_requests_total", "status" => status.to_string())
        .increment(1);
}
