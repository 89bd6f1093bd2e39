//! Meeting room centre performance: utilization, cancellation and revenue
//! with period-over-period trend arrows.

use serde::Serialize;
use serde_json::Value;

use crate::numeric::scalar_text;
use crate::payload::{first_of, lookup, text_or};
use crate::rows::MISSING_KEY;

const UP_ARROW: &str = "↑";

const CENTER_SOURCES: &[&[&str]] = &[
    &["data", "center_performance", "data"],
    &["data", "center_performance"],
    &["center_performance", "data"],
    &["data"],
    &[],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some(arrow) if arrow.trim() == UP_ARROW => Trend::Up,
            _ => Trend::Down,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingCenterRow {
    pub site_name: String,
    pub utilization_rate: String,
    pub utilization_trend: Trend,
    pub cancellation_rate: String,
    pub cancellation_trend: Trend,
    pub revenue: String,
    pub revenue_trend: Trend,
}

impl MeetingCenterRow {
    fn from_item(item: &Value) -> Self {
        let meeting = first_of(item, &[&["meeting_room"], &["meeting"]]).unwrap_or(&Value::Null);
        let text = |key: &str| {
            lookup(meeting, &[key])
                .and_then(scalar_text)
                .unwrap_or_else(|| "-".to_string())
        };
        Self {
            site_name: text_or(item, &["site_name", "site"], MISSING_KEY),
            utilization_rate: text("utilization_rate"),
            utilization_trend: Trend::from_value(meeting.get("utilization_trend")),
            cancellation_rate: text("cancellation_rate"),
            cancellation_trend: Trend::from_value(meeting.get("cancellation_trend")),
            revenue: text("revenue"),
            revenue_trend: Trend::from_value(meeting.get("revenue_trend")),
        }
    }
}

/// Centre rows from whichever container is present. A single object is
/// treated as a one-row list.
pub fn center_rows(payload: &Value) -> Vec<MeetingCenterRow> {
    match first_of(payload, CENTER_SOURCES) {
        Some(Value::Array(items)) => items.iter().map(MeetingCenterRow::from_item).collect(),
        Some(single @ Value::Object(_)) => vec![MeetingCenterRow::from_item(single)],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_center_performance_rows() {
        let payload = json!({"data": {"center_performance": {"data": [{
            "site_name": "Worli",
            "meeting_room": {
                "utilization_rate": "62%",
                "utilization_trend": "↑",
                "cancellation_rate": "4%",
                "cancellation_trend": "↓",
                "revenue": 12000
            }
        }]}}});
        let rows = center_rows(&payload);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.site_name, "Worli");
        assert_eq!(row.utilization_rate, "62%");
        assert_eq!(row.utilization_trend, Trend::Up);
        assert_eq!(row.cancellation_trend, Trend::Down);
        assert_eq!(row.revenue, "12000");
        assert_eq!(row.revenue_trend, Trend::Down);
    }

    #[test]
    fn test_single_object_payload() {
        let payload = json!({"site": "Solo", "meeting": {"revenue": "₹ 5k"}});
        let rows = center_rows(&payload);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].site_name, "Solo");
        assert_eq!(rows[0].revenue, "₹ 5k");
        assert_eq!(rows[0].utilization_rate, "-");
    }

    #[test]
    fn test_data_list_and_null() {
        let rows = center_rows(&json!({"data": [{"site_name": "A"}, {"site_name": "B"}]}));
        assert_eq!(rows.len(), 2);
        assert!(center_rows(&json!(null)).is_empty());
    }
}
