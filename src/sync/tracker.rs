//! Contact record inspection
//!
//! Applied to every contact record as a side effect of the contacts
//! traversal.

use super::context::{SyncContext, SyncWindow};
use crate::replication::{get_path, parse_iso8601};
use serde_json::Value;

/// Inspect one contact record, accumulating form GUIDs and event ids
pub fn observe_contact(ctx: &mut SyncContext, record: &Value, window: &SyncWindow) {
    if let Some(raw) = get_path(record, &["properties", "hs_calculated_form_submissions"])
        .and_then(Value::as_str)
    {
        ctx.form_guids.extend(parse_form_guids(raw));
    }

    if let Some(id) = qualifying_contact_id(record, window) {
        ctx.event_contact_ids.push(id);
    }
}

/// Parse a semicolon-delimited list of `guid:timestamp` pairs
///
/// Each segment contributes the substring before its first colon.
/// Segments without a colon, and segments with an empty GUID, are
/// skipped rather than failing the whole sync; sparse historical data
/// contains both.
pub fn parse_form_guids(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(';').filter_map(|segment| {
        let guid = &segment[..segment.find(':')?];
        if guid.is_empty() {
            None
        } else {
            Some(guid.to_string())
        }
    })
}

/// The contact's id, if either analytics timestamp places it inside the
/// sync window; at most one id per record regardless of how many fields
/// qualify
fn qualifying_contact_id(record: &Value, window: &SyncWindow) -> Option<String> {
    let visited_page = get_path(record, &["properties", "hs_analytics_last_timestamp"]);
    let submitted_form = get_path(record, &["properties", "recent_conversion_date"]);

    let in_window = [visited_page, submitted_form]
        .into_iter()
        .flatten()
        .filter_map(parse_iso8601)
        .any(|ts| window.contains(ts));
    if !in_window {
        return None;
    }

    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
