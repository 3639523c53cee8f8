//! Metrics collection and exposition.
//!
//! # Metrics
//! - `adt_transfers_total` (counter): transfer attempts by `outcome`
//!   (`settled` or an error kind)
//! - `adt_price_fetch_total` (counter): price API calls by `result`
//! - `adt_poll_votes_total` (counter): accepted poll votes by `option`
//! - `adt_rpc_healthy` (gauge): 1 when the last RPC call reached a provider
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter with an HTTP scrape endpoint.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_transfer(outcome: &str) {
    ::metrics::counter!("adt_transfers_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn record_price_fetch(result: &str) {
    ::metrics::counter!("adt_price_fetch_total", "result" => result.to_string()).increment(1);
}

pub fn record_poll_vote(option: &str) {
    ::metrics::counter!("adt_poll_votes_total", "option" => option.to_string()).increment(1);
}

pub fn record_rpc_health(healthy: bool) {
    ::metrics::gauge!("adt_rpc_healthy").set(if healthy { 1.0 } else { 0.0 });
}
