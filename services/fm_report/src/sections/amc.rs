//! AMC (annual maintenance contract) summary counters and contract lists.

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::numeric::coerce_opt;
use crate::payload::{adapt, first_array, first_of, first_text, lookup, text_or, ShapeAdapter};
use crate::period::days_until;
use crate::rows::MISSING_KEY;

/// Contracts ending within this many days get their renewal reminder highlighted.
const RENEWAL_WINDOW_DAYS: i64 = 31;

const REPORT_ROOT: &[&[&str]] = &[&["data"], &[]];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AmcSummary {
    pub active: f64,
    pub expiring_in_90_days: f64,
    pub expired: f64,
}

impl AmcSummary {
    fn from_flat(obj: &Value) -> Self {
        Self {
            active: coerce_opt(obj.get("active_amc_contracts")),
            expiring_in_90_days: coerce_opt(obj.get("contract_expiry_in_90_days")),
            expired: coerce_opt(obj.get("contract_expired")),
        }
    }
}

fn from_summary_block(payload: &Value) -> Option<AmcSummary> {
    let summary = first_of(payload, &[&["data", "summary"], &["summary"]])?;
    summary.is_object().then(|| AmcSummary::from_flat(summary))
}

/// Card overview carries active and expiring counts; expired ones are
/// counted from the contract details list.
fn from_card_overview(payload: &Value) -> Option<AmcSummary> {
    let cards = first_of(payload, &[&["card_overview"], &["data", "card_overview"]])?;
    if !cards.is_object() {
        return None;
    }
    let expired = lookup(payload, &["contract_details"])
        .and_then(Value::as_array)
        .map(|details| {
            details
                .iter()
                .filter(|c| c.get("contract_status").and_then(Value::as_str) == Some("Expired"))
                .count()
        })
        .unwrap_or(0);
    Some(AmcSummary {
        active: coerce_opt(lookup(cards, &["active_contracts", "count"])),
        expiring_in_90_days: coerce_opt(lookup(cards, &["expiring_soon", "count"])),
        expired: expired as f64,
    })
}

fn from_flat_root(payload: &Value) -> Option<AmcSummary> {
    payload.is_object().then(|| AmcSummary::from_flat(payload))
}

const SUMMARY_ADAPTERS: &[ShapeAdapter<AmcSummary>] = &[
    ShapeAdapter::new("summary", from_summary_block),
    ShapeAdapter::new("card_overview", from_card_overview),
    ShapeAdapter::new("flat_root", from_flat_root),
];

/// `None` only when the payload is not an object at all.
pub fn amc_summary(payload: &Value) -> Option<AmcSummary> {
    adapt("amc_contract_summary", payload, SUMMARY_ADAPTERS)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmcContract {
    pub site_name: String,
    pub amc_name: String,
    pub contract_start_date: String,
    pub contract_end_date: String,
    pub renewal_reminder: String,
    pub projected_renewal_cost: f64,
    pub vendor_contact: String,
    pub status: String,
}

impl AmcContract {
    fn from_item(item: &Value, default_status: &str) -> Self {
        Self {
            site_name: text_or(item, &["site_name", "center_name", "site"], MISSING_KEY),
            amc_name: text_or(
                item,
                &["amc_name", "contract_name", "asset_name", "service_name"],
                MISSING_KEY,
            ),
            contract_start_date: text_or(item, &["contract_start_date", "start_date"], ""),
            contract_end_date: text_or(item, &["contract_end_date", "end_date"], ""),
            renewal_reminder: text_or(
                item,
                &["renewal_reminder", "renewal_alert", "renewal_status"],
                "",
            ),
            projected_renewal_cost: coerce_opt(first_of(
                item,
                &[&["projected_renewal_cost"], &["contract_value"], &["projected_value"]],
            )),
            vendor_contact: text_or(item, &["vendor_name"], ""),
            status: text_or(item, &["status", "contract_status"], default_status),
        }
    }

    /// Highlight the reminder when the contract ends within a month from
    /// `today`, or the reminder text itself says so.
    pub fn renewal_due(&self, today: NaiveDate) -> bool {
        if let Some(days) = days_until(&self.contract_end_date, today) {
            if (0..=RENEWAL_WINDOW_DAYS).contains(&days) {
                return true;
            }
        }
        let reminder = self.renewal_reminder.to_lowercase();
        [r"within\s*1\s*month", r"\b1\s*month", r"30\s*day"]
            .iter()
            .any(|pattern| match Regex::new(pattern) {
                Ok(re) => re.is_match(&reminder),
                Err(_) => false,
            })
    }
}

/// `expiring_soon`, `EXPIRED`, ` Expiring Soon ` all compare equal to their
/// lowercase spaced form.
fn status_matches(item: &Value, wanted: &str) -> bool {
    first_text(item, &["status", "contract_status"])
        .map(|s| s.to_lowercase().replace('_', " ").trim() == wanted)
        .unwrap_or(false)
}

fn contract_list(
    payload: &Value,
    containers: &[&[&str]],
    wanted: &str,
    default_status: &str,
) -> Vec<AmcContract> {
    let Some(root) = first_of(payload, REPORT_ROOT) else {
        return Vec::new();
    };
    let Some(items) = first_array(root, containers) else {
        return Vec::new();
    };
    items
        .iter()
        .filter(|item| status_matches(item, wanted))
        .map(|item| AmcContract::from_item(item, default_status))
        .collect()
}

/// Contracts explicitly marked "Expiring Soon".
pub fn expiring_contracts(payload: &Value) -> Vec<AmcContract> {
    contract_list(
        payload,
        &[&["expiring_contracts"], &["contract_details"], &["expiring_in_90_days"]],
        "expiring soon",
        "",
    )
}

/// Contracts explicitly marked "Expired".
pub fn expired_contracts(payload: &Value) -> Vec<AmcContract> {
    contract_list(
        payload,
        &[
            &["expired_contracts"],
            &["expired_contract_details"],
            &["expired", "contract_details"],
            &["contract_details"],
        ],
        "expired",
        "Expired",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_summary_block_first() {
        let payload = json!({
            "data": {"summary": {"active_amc_contracts": "12", "contract_expiry_in_90_days": 3, "contract_expired": 1}},
            "card_overview": {"active_contracts": {"count": 99}}
        });
        let summary = amc_summary(&payload).unwrap();
        assert_eq!(summary, AmcSummary { active: 12.0, expiring_in_90_days: 3.0, expired: 1.0 });
    }

    #[test]
    fn test_card_overview_counts_expired_details() {
        let payload = json!({
            "card_overview": {"active_contracts": {"count": 8}, "expiring_soon": {"count": 2}},
            "contract_details": [
                {"contract_status": "Expired"},
                {"contract_status": "Expired"},
                {"contract_status": "Active"}
            ]
        });
        let summary = amc_summary(&payload).unwrap();
        assert_eq!(summary.active, 8.0);
        assert_eq!(summary.expiring_in_90_days, 2.0);
        assert_eq!(summary.expired, 2.0);
    }

    #[test]
    fn test_flat_root_and_non_object() {
        let summary = amc_summary(&json!({"active_amc_contracts": 4})).unwrap();
        assert_eq!(summary.active, 4.0);
        assert_eq!(summary.expired, 0.0);
        assert!(amc_summary(&json!(null)).is_none());
        assert!(amc_summary(&json!([1, 2])).is_none());
    }

    #[test]
    fn test_expiring_contracts_filter_and_fields() {
        let payload = json!({"data": {"contract_details": [
            {
                "center_name": "BKC",
                "contract_name": "Lift AMC",
                "start_date": "2024-04-01",
                "end_date": "2025-03-31",
                "renewal_alert": "Within 1 Month",
                "contract_value": "45000",
                "vendor_name": "Otis",
                "contract_status": "expiring_soon"
            },
            {"site_name": "X", "contract_status": "Expired"}
        ]}});
        let rows = expiring_contracts(&payload);
        assert_eq!(rows.len(), 1);
        let c = &rows[0];
        assert_eq!(c.site_name, "BKC");
        assert_eq!(c.amc_name, "Lift AMC");
        assert_eq!(c.contract_end_date, "2025-03-31");
        assert_eq!(c.projected_renewal_cost, 45000.0);
        assert_eq!(c.vendor_contact, "Otis");
        assert_eq!(c.status, "expiring_soon");
    }

    #[test]
    fn test_expired_contracts_default_status() {
        let payload = json!({"expired": {"contract_details": [
            {"amc_name": "HVAC", "status": "EXPIRED"},
            {"amc_name": "Pumps", "status": "Active"}
        ]}});
        let rows = expired_contracts(&payload);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amc_name, "HVAC");
        assert_eq!(rows[0].site_name, "-");
        assert_eq!(rows[0].status, "EXPIRED");
    }

    #[test]
    fn test_renewal_due() {
        let today = day(2025, 3, 1);
        let mut c = AmcContract::from_item(&json!({"contract_end_date": "2025-03-20"}), "");
        assert!(c.renewal_due(today));

        c.contract_end_date = "2025-06-01".to_string();
        assert!(!c.renewal_due(today));
        c.renewal_reminder = "Renew in 30 days".to_string();
        assert!(c.renewal_due(today));

        c.renewal_reminder = "11 months".to_string();
        assert!(!c.renewal_due(today));

        c.contract_end_date = "2025-02-20".to_string();
        c.renewal_reminder.clear();
        assert!(!c.renewal_due(today));
    }
}
