//! Duration and timestamp helpers.
//!
//! Zone files and the daemon config carry durations as human-readable
//! strings (`10s`, `500ms`, `1m30s`), matching the operator-facing format
//! the rest of the tooling expects.

use std::time::{Duration, SystemTime};

use crate::errors::GslbError;

/// Parse a duration string, reporting the offending field on failure.
pub fn parse_duration(field: &str, value: &str) -> Result<Duration, GslbError> {
    humantime::parse_duration(value).map_err(|_| GslbError::InvalidDuration {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Parse a duration string, falling back to `default` when it is malformed.
///
/// Runtime getters use this so a record keeps probing even if an operator
/// edit slipped past validation.
pub fn parse_duration_or(value: &str, default: Duration) -> Duration {
    humantime::parse_duration(value).unwrap_or(default)
}

/// RFC 3339 rendering for last-probe timestamps (seconds precision).
pub fn format_rfc3339(ts: SystemTime) -> String {
    humantime::format_rfc3339_seconds(ts).to_string()
}
