//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gatekeeper_decisions_total` (counter): policy outcomes by decision
//! - `gatekeeper_rate_limited_total` (counter): rejected requests
//! - `gatekeeper_rate_limit_entries` (gauge): identifiers currently tracked,
//!   incremented on insert and reset to the exact count after each sweep
//! - `gatekeeper_sweep_removed_total` (counter): entries dropped by the sweeper
//!
//! Recording is a no-op until a recorder is installed, so tests and library
//! users that skip `init_metrics` pay nothing.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(decision: &'static str) {
    counter!("gatekeeper_decisions_total", "decision" => decision).increment(1);
}

pub fn record_rate_limited() {
    counter!("gatekeeper_rate_limited_total").increment(1);
}

/// A new identifier entered the registry.
pub fn record_registry_insert() {
    gauge!("gatekeeper_rate_limit_entries").increment(1.0);
}

pub fn record_registry_size(entries: usize) {
    gauge!("gatekeeper_rate_limit_entries").set(entries as f64);
}

pub fn record_sweep(removed: usize, remaining: usize) {
    counter!("gatekeeper_sweep_removed_total").increment(removed as u64);
    record_registry_size(remaining);
}
