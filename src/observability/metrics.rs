//! Metrics collection and exposition.
//!
//! # Metrics
//! - `autoswitch_probe_rounds_total` (counter): probe rounds by group, outcome
//! - `autoswitch_switches_total` (counter): applied selection changes by group
//! - `autoswitch_failure_count` (gauge): current consecutive-failure counter
//! - `autoswitch_group_healthy` (gauge): 1 = active selection healthy
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without the exporter
//!   installed every call is a no-op
//! - Labels carry the group name only, never endpoint URLs

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to start metrics endpoint"),
    }
}

/// Record the outcome of one probe round for a group.
pub fn record_probe_round(group: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!(
        "autoswitch_probe_rounds_total",
        "group" => group.to_string(),
        "outcome" => outcome,
    )
    .increment(1);
}

/// Record an applied selection change.
pub fn record_switch(group: &str) {
    metrics::counter!("autoswitch_switches_total", "group" => group.to_string()).increment(1);
}

/// Record the consecutive-failure counter after a round.
pub fn record_failure_count(group: &str, count: u32) {
    metrics::gauge!("autoswitch_failure_count", "group" => group.to_string())
        .set(f64::from(count));
}

/// Record whether the group's active selection was healthy this round.
pub fn record_group_health(group: &str, healthy: bool) {
    let value = if healthy { 1.0 } else { 0.0 };
    metrics::gauge!("autoswitch_group_healthy", "group" => group.to_string()).set(value);
}
