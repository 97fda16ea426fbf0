//! Change detection: content fingerprint plus timestamp comparison.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::models::{ChangeReason, NotificationState};

/// Compact JSON serialization with object keys recursively sorted. The
/// result is identical for payloads that differ only in key order, at any
/// nesting depth, so the fingerprint is reproducible across runs.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            out.push('{');
            for (i, (key, val)) in sorted.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Key serialization cannot fail for a String.
                out.push_str(&serde_json::to_string(key).unwrap_or_default());
                out.push(':');
                write_canonical(val, out);
            }
            out.push('}');
        }
        Value::Array(arr) => {
            out.push('[');
            for (i, val) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(val, out);
            }
            out.push(']');
        }
        leaf => out.push_str(&serde_json::to_string(leaf).unwrap_or_default()),
    }
}

/// Lowercase hex SHA-256 over the canonical form of the stock `data`.
pub fn fingerprint(data: &Value) -> String {
    let digest = Sha256::digest(canonical_json(data).as_bytes());
    hex::encode(digest)
}

/// Decide whether a broadcast is warranted. `None` means no change.
///
/// - `Timestamp`: the feed reports a non-empty `updated_at` different from
///   the stored one.
/// - `ContentHash`: the content fingerprint moved even though the timestamp
///   did not.
/// - `Initial`: first-ever observation with a timestamp; overrides the
///   other reasons so the first push is labeled as such.
pub fn evaluate(
    prev: &NotificationState,
    updated_at: Option<&str>,
    hash: &str,
) -> Option<ChangeReason> {
    let new_ts = updated_at.filter(|s| !s.is_empty());

    let mut reason = None;
    if let Some(ts) = new_ts {
        if prev.updated_at.as_deref() != Some(ts) {
            reason = Some(ChangeReason::Timestamp);
        }
    }
    if reason.is_none() && prev.hash.as_deref() != Some(hash) {
        reason = Some(ChangeReason::ContentHash);
    }
    if prev.updated_at.is_none() && new_ts.is_some() {
        reason = Some(ChangeReason::Initial);
    }
    reason
}
