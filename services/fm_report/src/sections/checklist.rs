//! Site-wise checklist progress by status, current period and change vs last.

use serde::Serialize;
use serde_json::Value;

use crate::numeric::coerce_number;
use crate::payload::{adapt, first_array, first_of, lookup, text_or, ShapeAdapter};
use crate::rows::MISSING_KEY;

pub const STATUS_LABELS: [&str; 5] = [
    "Open",
    "Work In Progress",
    "Overdue",
    "Partially Closed",
    "Closed",
];

const REPORT_ROOT: &[&[&str]] = &[&["data"], &[]];
const KEY_ALIASES: &[&str] = &["site_name", "center_name", "site"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusCounts {
    pub open: f64,
    pub in_progress: f64,
    pub overdue: f64,
    pub partially_closed: f64,
    pub closed: f64,
}

impl StatusCounts {
    /// Counts from a `current_quarter`/`last_quarter` bucket, which names
    /// statuses either by workflow (`not_completed`, `delayed`, ...) or directly.
    fn from_bucket(bucket: Option<&Value>) -> Self {
        let Some(bucket) = bucket else {
            return Self::default();
        };
        let read = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| lookup(bucket, &[*k]))
                .map(coerce_number)
                .unwrap_or(0.0)
        };
        Self {
            open: read(&["not_completed", "open"]),
            in_progress: read(&["in_progress"]),
            overdue: read(&["delayed", "overdue"]),
            partially_closed: read(&["partial", "partially_closed"]),
            closed: read(&["completed", "closed"]),
        }
    }

    /// Legacy rows keyed by display label; `fallback` is consulted per status
    /// when `primary` does not carry it.
    fn from_labels(primary: Option<&Value>, fallback: Option<&Value>) -> Self {
        let read = |label: &str| {
            primary
                .and_then(|p| lookup(p, &[label]))
                .or_else(|| fallback.and_then(|f| lookup(f, &[label])))
                .map(coerce_number)
                .unwrap_or(0.0)
        };
        let [open, in_progress, overdue, partially_closed, closed] = STATUS_LABELS.map(read);
        Self { open, in_progress, overdue, partially_closed, closed }
    }

    fn minus(&self, other: &Self) -> Self {
        Self {
            open: self.open - other.open,
            in_progress: self.in_progress - other.in_progress,
            overdue: self.overdue - other.overdue,
            partially_closed: self.partially_closed - other.partially_closed,
            closed: self.closed - other.closed,
        }
    }

    /// Values in [`STATUS_LABELS`] order.
    pub fn values(&self) -> [f64; 5] {
        [self.open, self.in_progress, self.overdue, self.partially_closed, self.closed]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistRow {
    pub site_name: String,
    pub current: StatusCounts,
    pub difference: StatusCounts,
}

fn from_site_wise_breakdown(payload: &Value) -> Option<Vec<ChecklistRow>> {
    let root = first_of(payload, REPORT_ROOT)?;
    let breakdown = first_array(root, &[&["site_wise_breakdown"], &["data", "site_wise_breakdown"]])?;
    if breakdown.is_empty() {
        return None;
    }
    Some(
        breakdown
            .iter()
            .map(|row| {
                let current = StatusCounts::from_bucket(lookup(row, &["current_quarter"]));
                let last = StatusCounts::from_bucket(lookup(row, &["last_quarter"]));
                ChecklistRow {
                    site_name: text_or(row, KEY_ALIASES, MISSING_KEY),
                    difference: current.minus(&last),
                    current,
                }
            })
            .collect(),
    )
}

/// Legacy rows carry no previous period, so a missing difference is zero.
fn from_legacy_progress(payload: &Value) -> Option<Vec<ChecklistRow>> {
    let root = first_of(payload, REPORT_ROOT)?;
    let list = first_array(root, &[&["checklist_progress"], &["progress"]])?;
    Some(
        list.iter()
            .map(|row| {
                let current = first_of(row, &[&["current_period"], &["current"], &["period_current"]]);
                let difference = first_of(row, &[&["difference"], &["delta"]]);
                ChecklistRow {
                    site_name: text_or(row, KEY_ALIASES, MISSING_KEY),
                    current: StatusCounts::from_labels(current, Some(row)),
                    difference: StatusCounts::from_labels(difference, None),
                }
            })
            .collect(),
    )
}

const ADAPTERS: &[ShapeAdapter<Vec<ChecklistRow>>] = &[
    ShapeAdapter::new("site_wise_breakdown", from_site_wise_breakdown),
    ShapeAdapter::new("legacy_checklist_progress", from_legacy_progress),
];

pub fn checklist_progress(payload: &Value) -> Vec<ChecklistRow> {
    adapt("site_wise_checklist", payload, ADAPTERS).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_site_wise_breakdown_difference() {
        let payload = json!({"data": {"site_wise_breakdown": [{
            "site_name": "Andheri",
            "current_quarter": {"not_completed": 10, "in_progress": 2, "delayed": 4, "partial": 1, "completed": 30},
            "last_quarter": {"open": 12, "overdue": 1, "closed": "25"}
        }]}});
        let rows = checklist_progress(&payload);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].site_name, "Andheri");
        assert_eq!(rows[0].current.values(), [10.0, 2.0, 4.0, 1.0, 30.0]);
        assert_eq!(rows[0].difference.values(), [-2.0, 2.0, 3.0, 1.0, 5.0]);
    }

    #[test]
    fn test_nested_data_breakdown() {
        let payload = json!({"data": {"data": {"site_wise_breakdown": [{"center_name": "C"}]}}});
        let rows = checklist_progress(&payload);
        assert_eq!(rows[0].site_name, "C");
        assert_eq!(rows[0].current, StatusCounts::default());
    }

    #[test]
    fn test_legacy_progress_labels() {
        let payload = json!({"checklist_progress": [{
            "site": "Old",
            "current_period": {"Open": "12%", "Closed": 40},
            "Overdue": 3,
            "difference": {"Closed": -2.5}
        }]});
        let rows = checklist_progress(&payload);
        assert_eq!(rows[0].site_name, "Old");
        assert_eq!(rows[0].current.open, 12.0);
        assert_eq!(rows[0].current.overdue, 3.0);
        assert_eq!(rows[0].current.closed, 40.0);
        assert_eq!(rows[0].difference.closed, -2.5);
        assert_eq!(rows[0].difference.overdue, 0.0);
    }

    #[test]
    fn test_empty_breakdown_uses_legacy() {
        let payload = json!({"site_wise_breakdown": [], "progress": [{"site_name": "L"}]});
        assert_eq!(checklist_progress(&payload)[0].site_name, "L");
        assert!(checklist_progress(&json!({"nothing": 1})).is_empty());
    }
}
