//! Consumable inventory comparison: last vs current quarter spend per site.

use serde::Serialize;
use serde_json::Value;

use crate::rows::{max_metric, normalize, CanonicalRow, MetricSpec, RowSpec};

pub const LAST: &str = "Last";
pub const CURRENT: &str = "Current";

const AXIS_ROUNDING: f64 = 100_000.0;
const AXIS_STEPS: usize = 5;

const COMPARISON: RowSpec = RowSpec {
    section: "consumable_inventory_comparison",
    containers: &[
        &["data", "consumable_inventory_comparison"],
        &["consumable_inventory_comparison"],
        &[],
    ],
    key_aliases: &["site_name", "site"],
    metrics: &[
        MetricSpec { name: LAST, aliases: &[&["last_quarter"]] },
        MetricSpec { name: CURRENT, aliases: &[&["current_quarter"]] },
    ],
};

/// Comparison rows keyed by site, read from the first container that is a list.
pub fn comparison_rows(payload: &Value) -> Vec<CanonicalRow> {
    normalize(payload, &COMPARISON)
}

/// Value axis for the comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartAxis {
    pub max: f64,
    pub ticks: Vec<f64>,
}

impl ChartAxis {
    /// Largest value rounded up to the next 100 000, split into six ticks.
    pub fn for_rows(rows: &[CanonicalRow]) -> Self {
        let max = max_metric(rows, &[LAST, CURRENT]);
        let rounded = (max / AXIS_ROUNDING).ceil() * AXIS_ROUNDING;
        Self::with_max(rounded.max(max))
    }

    fn with_max(max: f64) -> Self {
        if max == 0.0 {
            return Self { max, ticks: vec![0.0] };
        }
        let step = max / AXIS_STEPS as f64;
        let ticks = (0..=AXIS_STEPS).map(|i| (step * i as f64).round()).collect();
        Self { max, ticks }
    }
}
