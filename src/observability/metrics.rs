//! Metrics collection and exposition.
//!
//! # Metrics
//! - `failover_probe_total` (counter): probe results by probe kind and result
//! - `failover_server_failures` (gauge): consecutive failures per identity,
//!   zeroed when the server leaves the pool
//! - `failover_removals_total` (counter): record deletions by result
//! - `failover_alerts_total` (counter): alert deliveries by result
//! - `failover_pool_refresh_total` (counter): pool refreshes by result
//! - `failover_pool_size` (gauge): servers in the current snapshot
//!
//! Recording without an installed exporter is a no-op, so tests and
//! deployments with metrics disabled pay nothing.

use std::net::SocketAddr;

use crate::health::ProbeKind;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
    {
        Ok(()) => tracing::info!(address = %addr, "Prometheus metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

fn result_label(ok: bool) -> &'static str {
    if ok {
        "success"
    } else {
        "failure"
    }
}

pub fn record_probe(kind: ProbeKind, healthy: bool) {
    ::metrics::counter!(
        "failover_probe_total",
        "probe" => kind.as_str(),
        "result" => result_label(healthy)
    )
    .increment(1);
}

pub fn record_failures(identity: &str, failures: u32) {
    ::metrics::gauge!("failover_server_failures", "identity" => identity.to_string()).set(f64::from(failures));
}

/// Zero the per-server gauge once the server leaves the snapshot.
pub fn clear_failures(identity: &str) {
    ::metrics::gauge!("failover_server_failures", "identity" => identity.to_string()).set(0.0);
}

pub fn record_removal(success: bool) {
    ::metrics::counter!("failover_removals_total", "result" => result_label(success)).increment(1);
}

pub fn record_alert(delivered: bool) {
    ::metrics::counter!("failover_alerts_total", "result" => result_label(delivered)).increment(1);
}

pub fn record_refresh(success: bool) {
    ::metrics::counter!("failover_pool_refresh_total", "result" => result_label(success)).increment(1);
}

pub fn set_pool_size(size: usize) {
    ::metrics::gauge!("failover_pool_size").set(size as f64);
}
