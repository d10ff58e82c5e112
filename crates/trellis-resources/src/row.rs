//! Helpers for decoding JSON rows and filter parameters.

use std::collections::HashMap;
use trellis_api::ApiError;

pub(crate) fn str_field(row: &serde_json::Value, key: &str) -> Option<String> {
    row.get(key).and_then(serde_json::Value::as_str).map(str::to_string)
}

pub(crate) fn time_field(
    row: &serde_json::Value,
    key: &str,
) -> Option<chrono::DateTime<chrono::Utc>> {
    row.get(key)
        .and_then(serde_json::Value::as_str)
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&chrono::Utc))
}

/// Parse an integer filter value; a present but non-numeric value is a
/// caller error rather than a silently empty result.
pub(crate) fn int_filter(
    filters: &HashMap<String, String>,
    key: &str,
) -> Result<Option<i64>, ApiError> {
    match filters.get(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ApiError::programming(format!("filter '{}' must be an integer", key))),
    }
}
