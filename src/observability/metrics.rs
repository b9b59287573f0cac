//! Metrics collection and exposition.
//!
//! # Metrics
//! - `auction_tx_submitted_total` (counter): submissions by payload kind
//! - `auction_tx_polls_total` (counter): status queries
//! - `auction_tx_outcomes_total` (counter): terminal outcomes by kind
//! - `auction_tx_finalization_seconds` (histogram): submit-to-terminal latency
//! - `auction_invocations_total` (counter): read-only calls by result
//! - `auction_participation_cache_lookups_total` (counter): hits and misses
//! - `auction_participation_cache_entries` (gauge): cached participation entries

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_submission(kind: &'static str) {
    metrics::counter!("auction_tx_submitted_total", "kind" => kind).increment(1);
}

pub fn record_poll() {
    metrics::counter!("auction_tx_polls_total").increment(1);
}

pub fn record_outcome(outcome: &'static str, elapsed: Duration) {
    metrics::counter!("auction_tx_outcomes_total", "outcome" => outcome).increment(1);
    metrics::histogram!("auction_tx_finalization_seconds").record(elapsed.as_secs_f64());
}

pub fn record_invocation(result: &'static str) {
    metrics::counter!("auction_invocations_total", "result" => result).increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("auction_participation_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_cache_size(size: usize) {
    metrics::gauge!("auction_participation_cache_entries").set(size as f64);
}
