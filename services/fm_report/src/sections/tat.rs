//! Response and resolution TAT achievement per centre.

use serde_json::Value;

use crate::payload::first_array;
use crate::rows::{max_metric, normalize, CanonicalRow, MetricSpec, RowSpec};

pub const LAST: &str = "Last";
pub const CURRENT: &str = "Current";

const PERFORMANCE: &[&[&str]] = &[&["data", "performance_data"], &["performance_data"]];
const KEY_ALIASES: &[&str] = &["center_name", "site_name", "site"];

const RESPONSE: RowSpec = RowSpec {
    section: "response_tat_performance_quarterly",
    containers: PERFORMANCE,
    key_aliases: KEY_ALIASES,
    metrics: &[
        MetricSpec {
            name: LAST,
            aliases: &[
                &["previous_period", "response_tat", "achieved_percentage"],
                &["previous_period", "response_achieved_percentage"],
            ],
        },
        MetricSpec {
            name: CURRENT,
            aliases: &[
                &["current_period", "response_tat", "achieved_percentage"],
                &["current_period", "response_achieved_percentage"],
            ],
        },
    ],
};

const RESOLUTION: RowSpec = RowSpec {
    section: "resolution_tat_performance_quarterly",
    containers: PERFORMANCE,
    key_aliases: KEY_ALIASES,
    metrics: &[
        MetricSpec {
            name: LAST,
            aliases: &[
                &["previous_period", "resolution_tat", "achieved_percentage"],
                &["previous_period", "resolution_achieved_percentage"],
            ],
        },
        MetricSpec {
            name: CURRENT,
            aliases: &[
                &["current_period", "resolution_tat", "achieved_percentage"],
                &["current_period", "resolution_achieved_percentage"],
            ],
        },
    ],
};

/// Response TAT achieved percentage, previous vs current period.
pub fn response_rows(payload: &Value) -> Vec<CanonicalRow> {
    normalize(payload, &RESPONSE)
}

/// Resolution TAT rows. The response payload often embeds resolution figures,
/// so it is read when the resolution payload carries no performance data.
pub fn resolution_rows(resolution: &Value, response: &Value) -> Vec<CanonicalRow> {
    let source = if first_array(resolution, PERFORMANCE).is_some() {
        resolution
    } else {
        response
    };
    normalize(source, &RESOLUTION)
}

/// Upper bound of the percentage axis: at least 100, rounded up to a multiple of 10.
pub fn chart_max(rows: &[CanonicalRow]) -> f64 {
    if rows.is_empty() {
        return 100.0;
    }
    let max = max_metric(rows, &[LAST, CURRENT]);
    (max.max(100.0) / 10.0).ceil() * 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_nested_and_flat() {
        let payload = json!({"data": {"performance_data": [
            {
                "center_name": "C1",
                "previous_period": {"response_tat": {"achieved_percentage": 80.5}},
                "current_period": {"response_achieved_percentage": "91"}
            },
            {"site": "C2"}
        ]}});
        let rows = response_rows(&payload);
        assert_eq!(rows[0].key, "C1");
        assert_eq!(rows[0].metric(LAST), 80.5);
        assert_eq!(rows[0].metric(CURRENT), 91.0);
        assert_eq!(rows[1].metric(LAST), 0.0);
    }

    #[test]
    fn test_resolution_falls_back_to_response_payload() {
        let response = json!({"performance_data": [
            {"site_name": "S", "current_period": {"resolution_tat": {"achieved_percentage": 70}}}
        ]});
        let rows = resolution_rows(&json!(null), &response);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metric(CURRENT), 70.0);

        let own = json!({"performance_data": []});
        assert!(resolution_rows(&own, &response).is_empty());
    }

    #[test]
    fn test_performance_skips_non_list_container() {
        let payload = json!({
            "data": {"performance_data": {"message": "no data"}},
            "performance_data": [
                {"center_name": "C1", "current_period": {"response_achieved_percentage": 88}}
            ]
        });
        let rows = response_rows(&payload);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metric(CURRENT), 88.0);

        let resolution = json!({"data": {"performance_data": {}}});
        let response = json!({"performance_data": [
            {"site_name": "S", "current_period": {"resolution_achieved_percentage": 64}}
        ]});
        let rows = resolution_rows(&resolution, &response);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metric(CURRENT), 64.0);
    }

    #[test]
    fn test_chart_max() {
        assert_eq!(chart_max(&[]), 100.0);
        let rows = vec![CanonicalRow::new("a").with(LAST, 40.0).with(CURRENT, 60.0)];
        assert_eq!(chart_max(&rows), 100.0);
        let rows = vec![CanonicalRow::new("a").with(LAST, 123.0)];
        assert_eq!(chart_max(&rows), 130.0);
    }
}
