//! Headline cards: helpdesk snapshot, device statistics, customer experience
//! bands and the inventory overview.

use serde::Serialize;
use serde_json::Value;

use crate::format::format_currency;
use crate::numeric::scalar_text;
use crate::payload::{first_of, lookup};

/// A labelled headline figure, optionally with a secondary line (a share or
/// percentage).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCard {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SummaryCard {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

fn text_at(value: &Value, paths: &[&[&str]], default: &str) -> String {
    first_of(value, paths)
        .and_then(scalar_text)
        .unwrap_or_else(|| default.to_string())
}

const SNAPSHOT_TICKETS: [(&str, &str, bool); 5] = [
    ("total_tickets", "Total Tickets", true),
    ("closed_tickets", "Closed Tickets", true),
    ("open_tickets", "Open Tickets", true),
    ("customer_tickets", "Customer Tickets", false),
    ("fm_tickets", "FM Tickets", false),
];

/// Ticket counts followed by the average customer rating card. Labels come
/// from the API when it sends them.
pub fn helpdesk_snapshot(payload: &Value) -> Vec<SummaryCard> {
    let snapshot = lookup(payload, &["data", "snapshot"]).unwrap_or(&Value::Null);
    let mut cards: Vec<SummaryCard> = SNAPSHOT_TICKETS
        .iter()
        .map(|(key, default_label, has_share)| {
            let entry = lookup(snapshot, &[*key]).unwrap_or(&Value::Null);
            let card = SummaryCard::new(
                text_at(entry, &[&["label"]], default_label),
                text_at(entry, &[&["count"]], "0"),
            );
            if *has_share {
                card.with_detail(format!("{} %", text_at(entry, &[&["percentage"]], "-")))
            } else {
                card
            }
        })
        .collect();

    let rating = lookup(payload, &["data", "average_customer_rating"]).unwrap_or(&Value::Null);
    cards.push(SummaryCard::new(
        text_at(rating, &[&["label"]], "Total Average Customer Rating"),
        text_at(rating, &[&["rating"]], "0"),
    ));
    cards
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStats {
    pub total_active_users: String,
    pub android: String,
    pub ios: String,
    pub new_users: String,
}

pub fn device_stats(payload: &Value) -> DeviceStats {
    let data = lookup(payload, &["data"]).unwrap_or(&Value::Null);
    DeviceStats {
        total_active_users: text_at(
            data,
            &[&["summary", "total_active_users"], &["total_active_users"]],
            "-",
        ),
        android: text_at(
            data,
            &[&["summary", "platform_breakdown", "android"], &["android"]],
            "-",
        ),
        ios: text_at(data, &[&["summary", "platform_breakdown", "ios"], &["ios"]], "-"),
        new_users: text_at(data, &[&["new_users"], &["summary", "new_users"]], "-"),
    }
}

const RATING_BANDS: [(&str, &str); 5] = [
    ("excellent", "Excellent"),
    ("good", "Good"),
    ("average", "Average"),
    ("bad", "Bad"),
    ("poor", "Poor"),
];

/// The five feedback bands in fixed order; absent bands read as `0` / `0%`.
pub fn customer_experience_summary(payload: &Value) -> Vec<SummaryCard> {
    let summary = lookup(payload, &["data", "overall_summary"])
        .filter(|s| s.is_object())
        .unwrap_or(&Value::Null);
    RATING_BANDS
        .iter()
        .map(|(key, label)| {
            let band = lookup(summary, &[*key]).unwrap_or(&Value::Null);
            SummaryCard::new(*label, text_at(band, &[&["count"]], "0"))
                .with_detail(text_at(band, &[&["percentage"]], "0%"))
        })
        .collect()
}

/// Stock counts as plain text, inventory values as rupee amounts.
pub fn inventory_overview(payload: &Value) -> Vec<SummaryCard> {
    let summary = first_of(payload, &[&["data", "overview_summary"], &["summary"]])
        .filter(|s| s.is_object())
        .unwrap_or(&Value::Null);
    let currency = |key: &str| format_currency(lookup(summary, &[key]).unwrap_or(&Value::Null));
    vec![
        SummaryCard::new("Over Stock Items", text_at(summary, &[&["over_stock_items"]], "0")),
        SummaryCard::new("Under Stock Items", text_at(summary, &[&["under_stock_items"]], "0")),
        SummaryCard::new("Total Value Of Inventory", currency("total_value_of_inventory")),
        SummaryCard::new(
            "Capital Blocked In Overstocking",
            currency("capital_blocked_in_overstock"),
        ),
        SummaryCard::new("Total Value Of Spares", currency("total_value_of_spares")),
        SummaryCard::new("Total Value Of Consumables", currency("total_value_of_consumables")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_helpdesk_snapshot_defaults() {
        let payload = json!({"data": {
            "snapshot": {
                "total_tickets": {"count": 120, "percentage": 100},
                "closed_tickets": {"count": 90, "percentage": "75", "label": "Resolved"}
            },
            "average_customer_rating": {"rating": 4.2}
        }});
        let cards = helpdesk_snapshot(&payload);
        assert_eq!(cards.len(), 6);
        assert_eq!(cards[0], SummaryCard::new("Total Tickets", "120").with_detail("100 %"));
        assert_eq!(cards[1].label, "Resolved");
        assert_eq!(cards[2].value, "0");
        assert_eq!(cards[2].detail.as_deref(), Some("- %"));
        assert_eq!(cards[3].detail, None);
        assert_eq!(cards[5].label, "Total Average Customer Rating");
        assert_eq!(cards[5].value, "4.2");
    }

    #[test]
    fn test_device_stats_fallbacks() {
        let stats = device_stats(&json!({"data": {
            "summary": {"total_active_users": 50, "platform_breakdown": {"android": 30}},
            "ios": 20
        }}));
        assert_eq!(stats.total_active_users, "50");
        assert_eq!(stats.android, "30");
        assert_eq!(stats.ios, "20");
        assert_eq!(stats.new_users, "-");
    }

    #[test]
    fn test_customer_experience_bands() {
        let payload = json!({"data": {"overall_summary": {
            "excellent": {"count": 10, "percentage": "50%"},
            "poor": {"count": 1}
        }}});
        let cards = customer_experience_summary(&payload);
        let labels: Vec<_> = cards.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Excellent", "Good", "Average", "Bad", "Poor"]);
        assert_eq!(cards[0].detail.as_deref(), Some("50%"));
        assert_eq!(cards[1].value, "0");
        assert_eq!(cards[4].detail.as_deref(), Some("0%"));
        assert_eq!(customer_experience_summary(&json!(null))[2].value, "0");
    }

    #[test]
    fn test_inventory_overview_cards() {
        let payload = json!({"data": {"overview_summary": {
            "over_stock_items": 12,
            "total_value_of_inventory": 1234567,
            "capital_blocked_in_overstock": "₹250000"
        }}});
        let cards = inventory_overview(&payload);
        assert_eq!(cards[0].value, "12");
        assert_eq!(cards[1].value, "0");
        assert_eq!(cards[2].value, "₹ 12,34,567");
        assert_eq!(cards[3].value, "₹ 250000");
        assert_eq!(cards[5].value, "₹ 0");
    }
}
