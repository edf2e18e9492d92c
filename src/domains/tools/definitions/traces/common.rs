//! Helpers shared by the trace tools.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Pretty-print a JSON value with two-space indentation.
pub fn pretty_json(value: &Value) -> String {
    // Serializing a `Value` cannot fail: all map keys are strings.
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Check that a trace ID is a non-empty hexadecimal string.
pub fn is_trace_id(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Local date-time layouts accepted when there is no UTC offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO 8601 timestamp or a `YYYY-MM-DD` date into unix seconds.
///
/// Timestamps without an offset, and bare dates (midnight), are read as UTC.
/// A trailing `Z` is accepted on the shortened `HH:MM` form too.
pub fn parse_unix_seconds(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.timestamp());
    }

    let naive = value
        .strip_suffix('Z')
        .or_else(|| value.strip_suffix('z'))
        .unwrap_or(value);
    if let Some(timestamp) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
    {
        return Some(timestamp.and_utc().timestamp());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp())
}
