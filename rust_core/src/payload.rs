//! Payload normalizer for the upstream stock feed.
//!
//! The API is not well behaved: it sometimes returns a JSON object
//! (expected), sometimes a JSON string that itself contains JSON, and
//! sometimes HTML or plain text on errors. Everything funnels through
//! [`parse_stock_payload`] so both deployment shapes see identical payloads.

use serde_json::Value;
use thiserror::Error;

use crate::models::StockPayload;

const PREVIEW_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("non-JSON response: {0:?}")]
    NonJson(String),
    #[error("unexpected JSON string: {0:?}")]
    UnexpectedString(String),
    #[error("unexpected JSON type: {0}")]
    UnexpectedType(&'static str),
}

/// Parse a raw response body into a [`StockPayload`].
///
/// 1. Body must parse as JSON.
/// 2. A top-level JSON string gets one more parse attempt; only an inner
///    object is accepted.
/// 3. Any other top-level type is rejected.
/// 4. `updated_at` and `data` are read permissively: an empty timestamp is
///    treated as absent, a missing or non-object `data` becomes `{}`.
pub fn parse_stock_payload(body: &str) -> Result<StockPayload, PayloadError> {
    let parsed: Value = serde_json::from_str(body)
        .map_err(|_| PayloadError::NonJson(preview(body)))?;

    let root = match parsed {
        Value::Object(map) => Value::Object(map),
        Value::String(inner) => match serde_json::from_str::<Value>(&inner) {
            Ok(Value::Object(map)) => Value::Object(map),
            _ => return Err(PayloadError::UnexpectedString(preview(&inner))),
        },
        other => return Err(PayloadError::UnexpectedType(json_type_name(&other))),
    };

    let updated_at = root
        .get("updated_at")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    let data = match root.get("data") {
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => Value::Object(serde_json::Map::new()),
    };

    Ok(StockPayload { updated_at, data })
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LEN {
        text.to_string()
    } else {
        text.chars().take(PREVIEW_LEN).collect()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
