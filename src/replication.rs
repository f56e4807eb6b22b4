//! Replication value extraction
//!
//! A replication value is the per-record UTC timestamp used for
//! incremental bookmarking. Extraction traverses the descriptor's
//! replication path; a missing path, missing leaf or unparsable value
//! yields `None`. This is a bookmarking gap, never a record-drop
//! condition.

use crate::streams::{ReplicationFormat, StreamDescriptor};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// Extract and normalize the replication timestamp for a record
pub fn extract(record: &Value, descriptor: &StreamDescriptor) -> Option<DateTime<Utc>> {
    let leaf = get_path(record, descriptor.replication_path)?;
    match descriptor.replication_format {
        ReplicationFormat::EpochMillis => parse_millis(leaf),
        ReplicationFormat::Iso8601 => parse_iso8601(leaf),
        ReplicationFormat::None => None,
    }
}

/// Traverse a key path into a JSON document
///
/// Returns `None` on an empty path or when any intermediate lookup is
/// missing or falsy (null, false, 0, empty string/array/object).
pub fn get_path<'a>(obj: &'a Value, path: &[&str]) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    let mut current = obj;
    for key in path {
        current = current.get(key)?;
        if is_falsy(current) {
            return None;
        }
    }
    Some(current)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Parse an epoch-milliseconds value (JSON number or numeric string)
pub fn parse_millis(value: &Value) -> Option<DateTime<Utc>> {
    let ms = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    Utc.timestamp_millis_opt(ms).single()
}

/// Parse an ISO-8601 / RFC 3339 string into a UTC timestamp
pub fn parse_iso8601(value: &Value) -> Option<DateTime<Utc>> {
    let s = value.as_str()?;
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Convert a UTC timestamp to epoch milliseconds
pub fn datetime_to_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}
