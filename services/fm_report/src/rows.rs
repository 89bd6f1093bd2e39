//! Generic row normalizer: payload list -> keyed rows of numeric metrics.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::payload::{first_array, number_at, text_or, Path};

/// Placeholder key for rows whose site/category name is missing.
pub const MISSING_KEY: &str = "-";

/// A site- or category-keyed row of named metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRow {
    pub key: String,
    pub metrics: BTreeMap<String, f64>,
}

impl CanonicalRow {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.metrics.insert(name.to_string(), value);
        self
    }

    /// Metric value, `0.0` when the row does not carry it.
    pub fn metric(&self, name: &str) -> f64 {
        self.metrics.get(name).copied().unwrap_or(0.0)
    }
}

/// A declared metric and the ordered alias paths that may hold it.
#[derive(Debug, Clone, Copy)]
pub struct MetricSpec {
    pub name: &'static str,
    pub aliases: &'static [Path<'static>],
}

/// Where a section keeps its rows and how to read each one.
#[derive(Debug, Clone, Copy)]
pub struct RowSpec {
    pub section: &'static str,
    pub containers: &'static [Path<'static>],
    pub key_aliases: &'static [&'static str],
    pub metrics: &'static [MetricSpec],
}

/// Normalize the first list found at `spec.containers`. No list, no rows.
///
/// Input order is preserved and duplicate keys are kept.
pub fn normalize(payload: &Value, spec: &RowSpec) -> Vec<CanonicalRow> {
    match first_array(payload, spec.containers) {
        Some(items) => normalize_items(items, spec),
        None => {
            tracing::debug!(section = spec.section, "no row container in payload");
            Vec::new()
        }
    }
}

pub fn normalize_items(items: &[Value], spec: &RowSpec) -> Vec<CanonicalRow> {
    items.iter().map(|item| row_from_item(item, spec)).collect()
}

/// Read one raw item; a malformed item yields `'-'` with zeroed metrics.
pub fn row_from_item(item: &Value, spec: &RowSpec) -> CanonicalRow {
    let mut row = CanonicalRow::new(text_or(item, spec.key_aliases, MISSING_KEY));
    for metric in spec.metrics {
        row.metrics
            .insert(metric.name.to_string(), number_at(item, metric.aliases));
    }
    row
}

/// Largest metric value across rows (`0.0` for no rows).
pub fn max_metric(rows: &[CanonicalRow], names: &[&str]) -> f64 {
    rows.iter()
        .flat_map(|r| names.iter().map(move |n| r.metric(n)))
        .fold(0.0_f64, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SPEC: RowSpec = RowSpec {
        section: "test",
        containers: &[&["data", "rows", "data"], &["data", "rows"], &["rows"], &[]],
        key_aliases: &["site_name", "center_name", "site"],
        metrics: &[
            MetricSpec { name: "a", aliases: &[&["a"], &["alpha"]] },
            MetricSpec { name: "b", aliases: &[&["nested", "b"]] },
        ],
    };

    #[test]
    fn test_normalize_first_container_wins() {
        let payload = json!({
            "data": {"rows": [{"site_name": "A", "a": "3", "nested": {"b": 4}}]},
            "rows": [{"site_name": "ignored"}]
        });
        let rows = normalize(&payload, &SPEC);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "A");
        assert_eq!(rows[0].metric("a"), 3.0);
        assert_eq!(rows[0].metric("b"), 4.0);
    }

    #[test]
    fn test_normalize_root_list() {
        let payload = json!([{"site": "X", "alpha": 1}]);
        let rows = normalize(&payload, &SPEC);
        assert_eq!(rows[0].key, "X");
        assert_eq!(rows[0].metric("a"), 1.0);
    }

    #[test]
    fn test_normalize_no_container_is_empty() {
        assert!(normalize(&json!({"other": 1}), &SPEC).is_empty());
        assert!(normalize(&json!(null), &SPEC).is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let rows = normalize(&json!({"rows": [{}, "garbage"]}), &SPEC);
        assert_eq!(rows.len(), 2);
        for row in rows {
            assert_eq!(row.key, MISSING_KEY);
            assert_eq!(row.metric("a"), 0.0);
            assert_eq!(row.metric("b"), 0.0);
            assert_eq!(row.metrics.len(), 2);
        }
    }

    #[test]
    fn test_duplicates_and_order_preserved() {
        let payload = json!({"rows": [{"site": "B"}, {"site": "A"}, {"site": "B"}]});
        let keys: Vec<_> = normalize(&payload, &SPEC).into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["B", "A", "B"]);
    }

    #[test]
    fn test_max_metric() {
        let rows = vec![
            CanonicalRow::new("a").with("x", 3.0).with("y", 9.0),
            CanonicalRow::new("b").with("x", 5.0),
        ];
        assert_eq!(max_metric(&rows, &["x"]), 5.0);
        assert_eq!(max_metric(&rows, &["x", "y"]), 9.0);
        assert_eq!(max_metric(&[], &["x"]), 0.0);
    }
}
