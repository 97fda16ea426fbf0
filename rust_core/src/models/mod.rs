// Shared models for the Gagstock Rust services
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Stock payload
// ============================================================================

/// Normalized upstream payload. `data` is kept as the raw JSON object so the
/// fingerprint covers every field the feed sends, known or not; the formatter
/// converts category values permissively via [`CategoryBlock::from_value`].
#[derive(Debug, Clone)]
pub struct StockPayload {
    pub updated_at: Option<String>,
    pub data: Value,
}

impl StockPayload {
    /// `updated_at` for display, `"unknown"` when the feed carries none.
    pub fn updated_at_display(&self) -> &str {
        self.updated_at.as_deref().unwrap_or("unknown")
    }
}

/// One category section of the feed. All fields are best-effort; the
/// merchant fields only ever appear on the traveling-merchant category.
#[derive(Debug, Clone, Default)]
pub struct CategoryBlock {
    pub items: Vec<StockItem>,
    pub countdown: Option<String>,
    pub status: Option<String>,
    pub appear_in: Option<String>,
    pub merchant_name: Option<String>,
}

impl CategoryBlock {
    /// Build a block from a raw category value. Non-object values yield an
    /// empty block; non-object entries in `items` are skipped.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let items = obj
            .get("items")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(StockItem::from_value).collect())
            .unwrap_or_default();

        Self {
            items,
            countdown: string_field(obj.get("countdown")),
            status: string_field(obj.get("status")),
            appear_in: string_field(obj.get("appearIn")),
            merchant_name: string_field(obj.get("merchantName")),
        }
    }
}

/// A single in-stock item. Missing name/quantity fall back to `"?"` like the
/// rest of the pipeline; a missing emoji is simply empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockItem {
    pub name: String,
    pub quantity: String,
    pub emoji: String,
}

impl StockItem {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            name: string_field(obj.get("name")).unwrap_or_else(|| "?".to_string()),
            quantity: string_field(obj.get("quantity")).unwrap_or_else(|| "?".to_string()),
            emoji: string_field(obj.get("emoji")).unwrap_or_default(),
        })
    }
}

/// Read a field as text: strings pass through, numbers are stringified
/// (the feed flips between `"3"` and `3` for quantities).
fn string_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// Persisted notification state
// ============================================================================

/// The last-broadcast fingerprint. Single persisted record, nulls on first
/// run, overwritten after every completed poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationState {
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
}

/// Why a broadcast was warranted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    Timestamp,
    ContentHash,
    Initial,
}

impl ChangeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeReason::Timestamp => "timestamp",
            ChangeReason::ContentHash => "content-hash",
            ChangeReason::Initial => "initial",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_block_from_object() {
        let block = CategoryBlock::from_value(&json!({
            "items": [
                {"name": "Common Egg", "quantity": "3", "emoji": "🥚"},
                "not-an-object",
                {"quantity": 5}
            ],
            "countdown": "04:12"
        }));

        assert_eq!(block.items.len(), 2);
        assert_eq!(block.items[0].name, "Common Egg");
        assert_eq!(block.items[0].quantity, "3");
        assert_eq!(block.items[1].name, "?");
        assert_eq!(block.items[1].quantity, "5");
        assert_eq!(block.countdown.as_deref(), Some("04:12"));
        assert!(block.merchant_name.is_none());
    }

    #[test]
    fn test_category_block_from_non_object() {
        let block = CategoryBlock::from_value(&json!("nope"));
        assert!(block.items.is_empty());
        assert!(block.countdown.is_none());
    }

    #[test]
    fn test_notification_state_default_is_null() {
        let state: NotificationState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, NotificationState::default());
        assert!(state.updated_at.is_none());
        assert!(state.hash.is_none());
    }
}
