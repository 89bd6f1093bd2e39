//! Site-wise module adoption rates.

use serde::Serialize;
use serde_json::Value;

use crate::numeric::parse_lenient;
use crate::payload::{lookup, text_or};
use crate::rows::MISSING_KEY;

pub const MODULE_LABELS: [&str; 6] = [
    "Helpdesk",
    "Assets",
    "Checklist Tech",
    "Checklist Non Tech",
    "Inventory",
    "Meeting Room",
];

const NO_ADOPTION: &str = "0%";

/// One site's adoption percentages, kept as the text the API sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdoptionRow {
    pub site_name: String,
    pub helpdesk: String,
    pub assets: String,
    pub checklist_tech: String,
    pub checklist_non_tech: String,
    pub inventory: String,
    pub meeting_room: String,
}

impl AdoptionRow {
    fn from_item(item: &Value) -> Self {
        let pct = |keys: &[&str]| text_or(item, keys, NO_ADOPTION);
        Self {
            site_name: text_or(item, &["site_name"], MISSING_KEY),
            helpdesk: pct(&["helpdesk"]),
            assets: pct(&["assets"]),
            checklist_tech: pct(&["checklist_tech"]),
            checklist_non_tech: pct(&["checklist_nontech", "checklist_non_tech"]),
            inventory: pct(&["inventory"]),
            meeting_room: pct(&["meeting_room"]),
        }
    }

    /// Module cells in [`MODULE_LABELS`] order.
    pub fn cells(&self) -> [&str; 6] {
        [
            self.helpdesk.as_str(),
            self.assets.as_str(),
            self.checklist_tech.as_str(),
            self.checklist_non_tech.as_str(),
            self.inventory.as_str(),
            self.meeting_room.as_str(),
        ]
    }

    /// Numeric value of each cell, used for colour thresholds.
    pub fn values(&self) -> [f64; 6] {
        self.cells().map(|c| parse_lenient(c).unwrap_or(0.0))
    }
}

pub fn adoption_rows(payload: &Value) -> Vec<AdoptionRow> {
    lookup(payload, &["data", "adoption_rates"])
        .and_then(Value::as_array)
        .map(|items| items.iter().map(AdoptionRow::from_item).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_adoption_defaults() {
        let payload = json!({"data": {"adoption_rates": [
            {"site_name": "Powai", "helpdesk": "45%", "checklist_non_tech": "12.5%"},
            {}
        ]}});
        let rows = adoption_rows(&payload);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].helpdesk, "45%");
        assert_eq!(rows[0].assets, "0%");
        assert_eq!(rows[0].checklist_non_tech, "12.5%");
        assert_eq!(rows[0].values()[0], 45.0);
        assert_eq!(rows[1].site_name, "-");
        assert_eq!(rows[1].cells(), ["0%"; 6]);
    }

    #[test]
    fn test_adoption_missing_container() {
        assert!(adoption_rows(&json!({"adoption_rates": []})).is_empty());
    }
}
