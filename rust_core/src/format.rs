//! Message formatting for Telegram HTML parse mode.
//!
//! Every interpolated value is entity-escaped so item names containing
//! `<`, `>` or `&` cannot break the markup.

use serde_json::Value;

use crate::models::{CategoryBlock, StockPayload};

/// Categories rendered first, in this order; anything else follows in the
/// order the feed sent it.
const PREFERRED_ORDER: [&str; 6] = [
    "egg",
    "gear",
    "seed",
    "honey",
    "cosmetics",
    "travelingmerchant",
];

const TRAVELING_MERCHANT_KEY: &str = "travelingmerchant";
const NO_ITEMS: &str = "<i>No items</i>";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn bold(text: &str) -> String {
    format!("<b>{}</b>", escape_html(text))
}

fn code(text: &str) -> String {
    format!("<code>{}</code>", escape_html(text))
}

fn bullet(text: &str) -> String {
    format!("• {}", escape_html(text))
}

/// First char uppercased, the rest lowercased (matches how the feed's
/// category keys have always been displayed).
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

/// Render the whole notification: bold title, timestamp line, then one
/// section per category separated by blank lines. Header only when the
/// payload has no categories.
pub fn format_message(payload: &StockPayload) -> String {
    let updated_at = payload.updated_at_display();
    let header = format!("{}\nupdated_at: {}", bold("GAG Stock Update"), code(updated_at));

    let Some(data) = payload.data.as_object() else {
        return header;
    };

    let mut sections = Vec::new();
    for key in PREFERRED_ORDER {
        if let Some(value) = data.get(key) {
            sections.push(format_category(key, value));
        }
    }
    for (key, value) in data {
        if !PREFERRED_ORDER.contains(&key.as_str()) {
            sections.push(format_category(key, value));
        }
    }

    if sections.is_empty() {
        header
    } else {
        format!("{}\n\n{}", header, sections.join("\n\n"))
    }
}

pub fn format_category(name: &str, value: &Value) -> String {
    let block = CategoryBlock::from_value(value);
    let header = bold(&capitalize(name));

    if name.eq_ignore_ascii_case(TRAVELING_MERCHANT_KEY) {
        return format_traveling_merchant(header, &block);
    }

    let mut parts = vec![header];
    if let Some(cd) = &block.countdown {
        parts.push(format!("Refresh in: {}", code(cd)));
    }
    if block.items.is_empty() {
        parts.push(NO_ITEMS.to_string());
    } else {
        for item in &block.items {
            parts.push(bullet(&format!("{} {} ×{}", item.emoji, item.name, item.quantity)));
        }
    }
    parts.join("\n")
}

fn format_traveling_merchant(header: String, block: &CategoryBlock) -> String {
    let mut parts = vec![header];
    if let Some(merchant) = &block.merchant_name {
        parts.push(format!("Merchant: <i>{}</i>", escape_html(merchant)));
    }
    if let Some(status) = &block.status {
        parts.push(format!("Status: {}", code(status)));
    }
    if let Some(appear) = &block.appear_in {
        parts.push(format!("Appears in: {}", code(appear)));
    }
    if block.items.is_empty() {
        parts.push(NO_ITEMS.to_string());
    } else {
        parts.push("Items:".to_string());
        for item in &block.items {
            parts.push(bullet(&format!("{} {} ×{}", item.emoji, item.name, item.quantity)));
        }
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(updated_at: Option<&str>, data: Value) -> StockPayload {
        StockPayload {
            updated_at: updated_at.map(|s| s.to_string()),
            data,
        }
    }

    #[test]
    fn test_egg_scenario() {
        let p = payload(
            Some("2024-01-01T00:00Z"),
            json!({"egg": {"items": [{"name": "Common Egg", "quantity": "3", "emoji": "🥚"}]}}),
        );
        let msg = format_message(&p);
        assert!(msg.starts_with("<b>GAG Stock Update</b>"));
        assert!(msg.contains("updated_at: <code>2024-01-01T00:00Z</code>"));
        assert!(msg.contains("<b>Egg</b>"));
        assert!(msg.contains("• 🥚 Common Egg ×3"));
    }

    #[test]
    fn test_header_only_when_no_categories() {
        let p = payload(None, json!({}));
        let msg = format_message(&p);
        assert_eq!(
            msg,
            "<b>GAG Stock Update</b>\nupdated_at: <code>unknown</code>"
        );
    }

    #[test]
    fn test_reserved_characters_escaped() {
        let p = payload(
            Some("t<1>&"),
            json!({"gear": {"items": [{"name": "<script>&stuff", "quantity": "1>2", "emoji": ""}]}}),
        );
        let msg = format_message(&p);
        // Strip the intended markup tags, then no raw reserved chars remain.
        let stripped = msg
            .replace("<b>", "")
            .replace("</b>", "")
            .replace("<code>", "")
            .replace("</code>", "")
            .replace("<i>", "")
            .replace("</i>", "");
        assert!(!stripped.contains('<'), "unescaped '<' in {stripped}");
        assert!(!stripped.contains('>'), "unescaped '>' in {stripped}");
        assert!(msg.contains("&lt;script&gt;&amp;stuff"));
    }

    #[test]
    fn test_preferred_order_then_encounter_order() {
        let p = payload(
            Some("t1"),
            json!({
                "mystery": {"items": []},
                "seed": {"items": []},
                "egg": {"items": []},
                "aardvark": {"items": []}
            }),
        );
        let msg = format_message(&p);
        let egg = msg.find("<b>Egg</b>").unwrap();
        let seed = msg.find("<b>Seed</b>").unwrap();
        let mystery = msg.find("<b>Mystery</b>").unwrap();
        let aardvark = msg.find("<b>Aardvark</b>").unwrap();
        assert!(egg < seed);
        assert!(seed < mystery);
        // "mystery" was encountered before "aardvark" in the feed.
        assert!(mystery < aardvark);
    }

    #[test]
    fn test_countdown_and_placeholder() {
        let p = payload(Some("t1"), json!({"gear": {"items": [], "countdown": "12:00"}}));
        let msg = format_message(&p);
        assert!(msg.contains("Refresh in: <code>12:00</code>"));
        assert!(msg.contains("<i>No items</i>"));
    }

    #[test]
    fn test_traveling_merchant_section() {
        let p = payload(
            Some("t1"),
            json!({"travelingMerchant": {
                "merchantName": "Gnome & Co",
                "status": "arrived",
                "appearIn": "02:30",
                "items": [{"name": "Rare Hat", "quantity": "1", "emoji": "🎩"}]
            }}),
        );
        let msg = format_message(&p);
        assert!(msg.contains("<b>Travelingmerchant</b>"));
        assert!(msg.contains("Merchant: <i>Gnome &amp; Co</i>"));
        assert!(msg.contains("Status: <code>arrived</code>"));
        assert!(msg.contains("Appears in: <code>02:30</code>"));
        assert!(msg.contains("Items:"));
        assert!(msg.contains("• 🎩 Rare Hat ×1"));
    }

    #[test]
    fn test_traveling_merchant_without_items() {
        let p = payload(Some("t1"), json!({"travelingmerchant": {"status": "away"}}));
        let msg = format_message(&p);
        assert!(msg.contains("<i>No items</i>"));
        assert!(!msg.contains("Items:"));
    }

    #[test]
    fn test_sections_joined_with_blank_line() {
        let p = payload(Some("t1"), json!({"egg": {"items": []}, "gear": {"items": []}}));
        let msg = format_message(&p);
        assert!(msg.contains("<i>No items</i>\n\n<b>Gear</b>"));
    }
}
