//! Parking management: free / paid / vacant spaces per site.

use serde_json::Value;

use crate::numeric::{coerce_opt, scalar_text};
use crate::payload::{adapt, first_array, first_object, first_of, lookup, ShapeAdapter};
use crate::rows::{normalize_items, CanonicalRow, MetricSpec, RowSpec, MISSING_KEY};

pub const FREE: &str = "Free";
pub const PAID: &str = "Paid";
pub const VACANT: &str = "Vacant";

const MANAGEMENT: &[&[&str]] = &[&["data", "parking_management"], &["parking_management"]];

const SITE_WISE_DETAILS: RowSpec = RowSpec {
    section: "parking_date_site_wise",
    containers: &[],
    key_aliases: &["site_name", "site"],
    metrics: &[
        MetricSpec { name: FREE, aliases: &[&["free_parking_available"]] },
        MetricSpec { name: PAID, aliases: &[&["paid_parking_available"]] },
        MetricSpec { name: VACANT, aliases: &[&["vacant_spaces"]] },
    ],
};

const LEGACY_SUMMARY: RowSpec = RowSpec {
    section: "parking_date_site_wise",
    containers: &[&["data", "parking_summary"], &["parking_summary"]],
    key_aliases: &["site_name", "site"],
    metrics: &[
        MetricSpec { name: FREE, aliases: &[&["free_parking"]] },
        MetricSpec { name: PAID, aliases: &[&["paid_parking"]] },
        MetricSpec { name: VACANT, aliases: &[&["vacant_parking"]] },
    ],
};

fn from_site_wise_details(payload: &Value) -> Option<Vec<CanonicalRow>> {
    let details = first_object(payload, MANAGEMENT)?
        .get("site_wise_details")?
        .as_array()?;
    Some(normalize_items(details, &SITE_WISE_DETAILS))
}

/// `chart_data.x_axis.categories` with positional series Free, Paid, Vacant.
fn from_chart_series(payload: &Value) -> Option<Vec<CanonicalRow>> {
    let pm = first_of(payload, MANAGEMENT)?;
    let categories = lookup(pm, &["chart_data", "x_axis", "categories"])?.as_array()?;
    if categories.is_empty() {
        return None;
    }
    let series = lookup(pm, &["chart_data", "series"])?.as_array()?;
    let point = |s: usize, idx: usize| {
        coerce_opt(
            series
                .get(s)
                .and_then(|entry| entry.get("data"))
                .and_then(|d| d.get(idx)),
        )
    };
    Some(
        categories
            .iter()
            .enumerate()
            .map(|(idx, cat)| {
                let site = scalar_text(cat)
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| MISSING_KEY.to_string());
                CanonicalRow::new(site)
                    .with(FREE, point(0, idx))
                    .with(PAID, point(1, idx))
                    .with(VACANT, point(2, idx))
            })
            .collect(),
    )
}

fn from_legacy_summary(payload: &Value) -> Option<Vec<CanonicalRow>> {
    let items = first_array(payload, LEGACY_SUMMARY.containers)?;
    Some(normalize_items(items, &LEGACY_SUMMARY))
}

const ADAPTERS: &[ShapeAdapter<Vec<CanonicalRow>>] = &[
    ShapeAdapter::new("site_wise_details", from_site_wise_details),
    ShapeAdapter::new("chart_series", from_chart_series),
    ShapeAdapter::new("legacy_parking_summary", from_legacy_summary),
];

/// Parking rows keyed by site with `Free`, `Paid` and `Vacant` metrics.
pub fn parking_rows(payload: &Value) -> Vec<CanonicalRow> {
    adapt("parking_date_site_wise", payload, ADAPTERS).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_summary_shape() {
        let payload = json!({"data": {"parking_summary": [{"site_name": "A", "free_parking": 3}]}});
        let rows = parking_rows(&payload);
        assert_eq!(rows, vec![CanonicalRow::new("A").with(FREE, 3.0).with(PAID, 0.0).with(VACANT, 0.0)]);
    }

    #[test]
    fn test_site_wise_details_preferred() {
        let payload = json!({
            "data": {
                "parking_management": {
                    "site_wise_details": [
                        {"site": "B", "free_parking_available": "5", "paid_parking_available": 2, "vacant_spaces": 1}
                    ]
                },
                "parking_summary": [{"site_name": "legacy"}]
            }
        });
        let rows = parking_rows(&payload);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "B");
        assert_eq!(rows[0].metric(FREE), 5.0);
        assert_eq!(rows[0].metric(PAID), 2.0);
        assert_eq!(rows[0].metric(VACANT), 1.0);
    }

    #[test]
    fn test_chart_series_shape() {
        let payload = json!({
            "parking_management": {
                "chart_data": {
                    "x_axis": {"categories": ["North", ""]},
                    "series": [{"data": [1, 2]}, {"data": [3]}, {"data": [5, 6]}]
                }
            }
        });
        let rows = parking_rows(&payload);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "North");
        assert_eq!(rows[1].key, "-");
        assert_eq!(rows[1].metric(PAID), 0.0);
        assert_eq!(rows[1].metric(VACANT), 6.0);
    }

    #[test]
    fn test_no_shape_is_empty() {
        assert!(parking_rows(&json!({"unrelated": true})).is_empty());
        assert!(parking_rows(&json!(null)).is_empty());
    }
}
