//! Metrics collection and exposition.
//!
//! # Metrics
//! - `wallet_transactions_total` (counter): watched transactions by outcome
//! - `wallet_transfer_reconcile_total` (counter): indexer reconciliation by outcome
//! - `wallet_key_rotations_total` (counter): rotation attempts by outcome
//! - `wallet_pending_transactions` (gauge): records held by the pending store

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the final outcome of a watched transaction.
pub fn record_transaction(outcome: &'static str) {
    metrics::counter!("wallet_transactions_total", "outcome" => outcome).increment(1);
}

/// Record a transfer-list reconciliation outcome.
pub fn record_reconcile(outcome: &'static str) {
    metrics::counter!("wallet_transfer_reconcile_total", "outcome" => outcome).increment(1);
}

/// Record a key rotation outcome.
pub fn record_rotation(outcome: &'static str) {
    metrics::counter!("wallet_key_rotations_total", "outcome" => outcome).increment(1);
}

/// Record the pending store size.
pub fn record_pending_size(size: usize) {
    metrics::gauge!("wallet_pending_transactions").set(size as f64);
}
