//! Metric emission for the whole plugin.
//!
//! The names and label sets here are an operator-facing contract; the
//! exporter itself is wired up by the binary.

use std::time::Instant;

use metrics::{counter, gauge, histogram};

/// Why a healthcheck attempt failed, as exposed on the failure counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Timeout,
    Connection,
    Protocol,
    Other,
}

impl FailureReason {
    pub fn label(&self) -> &'static str {
        match self {
            FailureReason::Timeout => "timeout",
            FailureReason::Connection => "connection",
            FailureReason::Protocol => "protocol",
            FailureReason::Other => "other",
        }
    }
}

/// One finished healthcheck: result counter plus duration histogram.
pub fn observe_healthcheck(name: &str, check_type: &str, address: &str, start: Instant, ok: bool) {
    let result = if ok { "success" } else { "failure" };
    counter!(
        "gslb_healthcheck_total",
        "name" => name.to_string(),
        "type" => check_type.to_string(),
        "address" => address.to_string(),
        "result" => result
    )
    .increment(1);
    histogram!(
        "gslb_healthcheck_duration_seconds",
        "type" => check_type.to_string(),
        "address" => address.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn inc_healthcheck_failure(check_type: &str, address: &str, reason: FailureReason) {
    counter!(
        "gslb_healthcheck_failures_total",
        "type" => check_type.to_string(),
        "address" => address.to_string(),
        "reason" => reason.label()
    )
    .increment(1);
}

/// One answered (or failed) record resolution.
pub fn observe_record_resolution(name: &str, result: &str, start: Instant) {
    counter!(
        "gslb_record_resolution_total",
        "name" => name.to_string(),
        "result" => result.to_string()
    )
    .increment(1);
    histogram!(
        "gslb_record_resolution_duration_seconds",
        "name" => name.to_string(),
        "result" => result.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn inc_config_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("gslb_config_reload_total", "result" => result).increment(1);
}

pub fn inc_backend_selected(name: &str, address: &str) {
    counter!(
        "gslb_backend_selected_total",
        "name" => name.to_string(),
        "address" => address.to_string()
    )
    .increment(1);
}

/// Healthy backends currently active for a record.
pub fn set_active_backends(name: &str, count: usize) {
    gauge!("gslb_backend_active", "name" => name.to_string()).set(count as f64);
}

pub fn set_record_health(name: &str, healthy: bool) {
    gauge!("gslb_record_health_status", "name" => name.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn set_backend_health(name: &str, address: &str, healthy: bool) {
    gauge!(
        "gslb_backend_health_status",
        "name" => name.to_string(),
        "address" => address.to_string()
    )
    .set(if healthy { 1.0 } else { 0.0 });
}

pub fn set_healthcheck_status(name: &str, address: &str, check_type: &str, ok: bool) {
    gauge!(
        "gslb_healthcheck_status",
        "name" => name.to_string(),
        "address" => address.to_string(),
        "type" => check_type.to_string()
    )
    .set(if ok { 1.0 } else { 0.0 });
}

/// Configured totals, re-published after every (re)load.
pub fn set_configured_totals(records: usize, backends: usize, healthchecks: usize, zones: usize) {
    gauge!("gslb_records_total").set(records as f64);
    gauge!("gslb_backends_total").set(backends as f64);
    gauge!("gslb_healthchecks_total").set(healthchecks as f64);
    gauge!("gslb_zones_total").set(zones as f64);
}

pub fn set_version_info(version: &str) {
    gauge!("gslb_version_info", "version" => version.to_string()).set(1.0);
}
