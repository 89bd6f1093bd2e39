//! Visitor management: last vs current period visitor totals per site.

use serde_json::Value;

use crate::numeric::{coerce_opt, scalar_text};
use crate::payload::{adapt, first_array, first_of, lookup, ShapeAdapter};
use crate::rows::{normalize_items, CanonicalRow, MetricSpec, RowSpec, MISSING_KEY};

pub const LAST: &str = "Last";
pub const CURRENT: &str = "Current";

const MANAGEMENT: &[&[&str]] = &[&["data", "visitor_management"], &["visitor_management"]];

const SITE_WISE_ANALYSIS: RowSpec = RowSpec {
    section: "visitor_trend_analysis",
    containers: &[],
    key_aliases: &["site_name", "site"],
    metrics: &[
        MetricSpec {
            name: LAST,
            aliases: &[&["previous_period", "total_visitors"], &["previous_period", "total"]],
        },
        MetricSpec {
            name: CURRENT,
            aliases: &[&["current_period", "total_visitors"], &["current_period", "total"]],
        },
    ],
};

const LEGACY_TREND: RowSpec = RowSpec {
    section: "visitor_trend_analysis",
    containers: &[
        &["data", "visitor_trend_analysis"],
        &["visitor_trend_analysis"],
        &[],
    ],
    key_aliases: &["site_name", "site"],
    metrics: &[
        MetricSpec { name: LAST, aliases: &[&["last_quarter"], &["last_quarter_total"]] },
        MetricSpec { name: CURRENT, aliases: &[&["current_quarter"], &["current_quarter_total"]] },
    ],
};

fn from_site_wise_analysis(payload: &Value) -> Option<Vec<CanonicalRow>> {
    let vm = first_of(payload, MANAGEMENT)?;
    let analysis = lookup(vm, &["site_wise_analysis"])?.as_array()?;
    if analysis.is_empty() {
        return None;
    }
    Some(normalize_items(analysis, &SITE_WISE_ANALYSIS))
}

/// Chart series are matched by name: the first chart mentioning "last" and the
/// first mentioning "current" (case-insensitive).
fn from_chart_data(payload: &Value) -> Option<Vec<CanonicalRow>> {
    let vm = first_of(payload, MANAGEMENT)?;
    let categories = lookup(vm, &["chart_data", "x_axis", "categories"])?.as_array()?;
    let charts = lookup(vm, &["chart_data", "charts"])?.as_array()?;
    if categories.is_empty() || charts.is_empty() {
        return None;
    }

    let series_named = |needle: &str| {
        charts
            .iter()
            .find(|c| {
                c.get("name")
                    .and_then(Value::as_str)
                    .map(|n| n.to_lowercase().contains(needle))
                    .unwrap_or(false)
            })
            .and_then(|c| c.get("data"))
            .and_then(Value::as_array)
    };
    let last = series_named("last");
    let current = series_named("current");

    Some(
        categories
            .iter()
            .enumerate()
            .map(|(idx, cat)| {
                let site = scalar_text(cat)
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| MISSING_KEY.to_string());
                CanonicalRow::new(site)
                    .with(LAST, coerce_opt(last.and_then(|s| s.get(idx))))
                    .with(CURRENT, coerce_opt(current.and_then(|s| s.get(idx))))
            })
            .collect(),
    )
}

fn from_legacy_trend(payload: &Value) -> Option<Vec<CanonicalRow>> {
    let items = first_array(payload, LEGACY_TREND.containers)?;
    Some(normalize_items(items, &LEGACY_TREND))
}

const ADAPTERS: &[ShapeAdapter<Vec<CanonicalRow>>] = &[
    ShapeAdapter::new("site_wise_analysis", from_site_wise_analysis),
    ShapeAdapter::new("chart_data", from_chart_data),
    ShapeAdapter::new("legacy_visitor_trend", from_legacy_trend),
];

/// Visitor rows keyed by site with `Last` and `Current` metrics.
pub fn visitor_rows(payload: &Value) -> Vec<CanonicalRow> {
    adapt("visitor_trend_analysis", payload, ADAPTERS).unwrap_or_default()
}

/// Chart height for a row count: 40px per row plus padding, within 240..=800.
pub fn chart_height(row_count: usize) -> u32 {
    let rows = row_count.max(1) as u32;
    (rows * 40 + 80).clamp(240, 800)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_site_wise_analysis() {
        let payload = json!({
            "data": {"visitor_management": {"site_wise_analysis": [
                {"site_name": "A", "current_period": {"total_visitors": 10}, "previous_period": {"total": "7"}}
            ]}}
        });
        let rows = visitor_rows(&payload);
        assert_eq!(rows[0].key, "A");
        assert_eq!(rows[0].metric(CURRENT), 10.0);
        assert_eq!(rows[0].metric(LAST), 7.0);
    }

    #[test]
    fn test_chart_data_matches_by_name() {
        let payload = json!({"visitor_management": {"chart_data": {
            "x_axis": {"categories": ["A", "B"]},
            "charts": [
                {"name": "Current Quarter", "data": [5, 6]},
                {"name": "LAST quarter", "data": [1]}
            ]
        }}});
        let rows = visitor_rows(&payload);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].metric(LAST), 1.0);
        assert_eq!(rows[0].metric(CURRENT), 5.0);
        assert_eq!(rows[1].metric(LAST), 0.0);
        assert_eq!(rows[1].metric(CURRENT), 6.0);
    }

    #[test]
    fn test_empty_analysis_falls_back_to_legacy() {
        let payload = json!({
            "visitor_management": {"site_wise_analysis": []},
            "visitor_trend_analysis": [{"site": "Old", "last_quarter_total": 4, "current_quarter": 9}]
        });
        let rows = visitor_rows(&payload);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "Old");
        assert_eq!(rows[0].metric(LAST), 4.0);
        assert_eq!(rows[0].metric(CURRENT), 9.0);
    }

    #[test]
    fn test_root_list_shape() {
        let rows = visitor_rows(&json!([{"site_name": "R", "last_quarter": 2}]));
        assert_eq!(rows[0].key, "R");
        assert_eq!(rows[0].metric(LAST), 2.0);
    }

    #[test]
    fn test_chart_height_clamped() {
        assert_eq!(chart_height(0), 240);
        assert_eq!(chart_height(5), 280);
        assert_eq!(chart_height(100), 800);
    }
}
