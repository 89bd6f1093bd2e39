//! Asset management: company overview, centre downtime metrics and the
//! highest maintenance spend list.

use serde::Serialize;
use serde_json::Value;

use crate::numeric::{coerce_opt, scalar_text};
use crate::payload::{first_of, lookup, text_or};
use crate::rows::{normalize_items, CanonicalRow, MetricSpec, RowSpec};

pub const TOTAL_ASSETS: &str = "Total Assets";
pub const CRITICAL_BREAKDOWN: &str = "Critical Breakdown";
pub const CRITICAL_AVERAGE_DAY: &str = "Critical Average Day";
pub const NON_CRITICAL_BREAKDOWN: &str = "Non-Critical Breakdown";
pub const NON_CRITICAL_AVERAGE_DAY: &str = "Non-Critical Average Day";

/// `data` when present, otherwise the payload itself.
const REPORT_ROOT: &[&[&str]] = &[&["data"], &[]];

const CENTER_METRICS: RowSpec = RowSpec {
    section: "asset_overview",
    containers: &[&["center_metrics"]],
    key_aliases: &["site_name"],
    metrics: &[
        MetricSpec { name: TOTAL_ASSETS, aliases: &[&["total_assets"]] },
        MetricSpec { name: CRITICAL_BREAKDOWN, aliases: &[&["critical", "breakdown"]] },
        MetricSpec { name: CRITICAL_AVERAGE_DAY, aliases: &[&["critical", "average_day"]] },
        MetricSpec { name: NON_CRITICAL_BREAKDOWN, aliases: &[&["non_critical", "breakdown"]] },
        MetricSpec { name: NON_CRITICAL_AVERAGE_DAY, aliases: &[&["non_critical", "average_day"]] },
    ],
};

/// Company-wide headline figures. Missing values render as `"-"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyAssetOverview {
    pub total_available_asset: String,
    pub asset_in_breakdown: String,
    pub average_downtime: String,
}

impl Default for CompanyAssetOverview {
    fn default() -> Self {
        Self {
            total_available_asset: "-".to_string(),
            asset_in_breakdown: "-".to_string(),
            average_downtime: "-".to_string(),
        }
    }
}

pub fn company_overview(payload: &Value) -> CompanyAssetOverview {
    let Some(overview) = first_of(payload, REPORT_ROOT)
        .and_then(|root| lookup(root, &["company_asset_overview"]))
    else {
        return CompanyAssetOverview::default();
    };
    let text = |key: &str| {
        lookup(overview, &[key])
            .and_then(scalar_text)
            .unwrap_or_else(|| "-".to_string())
    };
    CompanyAssetOverview {
        total_available_asset: text("total_available_asset"),
        asset_in_breakdown: text("asset_in_breakdown"),
        average_downtime: lookup(overview, &["average_downtime_days"])
            .and_then(scalar_text)
            .map(|d| format!("{d} Days"))
            .unwrap_or_else(|| "-".to_string()),
    }
}

/// Per-centre asset counts with critical / non-critical breakdowns.
pub fn center_metrics(payload: &Value) -> Vec<CanonicalRow> {
    first_of(payload, REPORT_ROOT)
        .and_then(|root| lookup(root, &["center_metrics"]))
        .and_then(Value::as_array)
        .map(|items| normalize_items(items, &CENTER_METRICS))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceAsset {
    pub rank: String,
    pub asset_name_id: String,
    pub asset_category: String,
    pub site_name: String,
    pub total_maintenance_cost: f64,
    pub maintenance_percent: f64,
    pub remark: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HighestMaintenance {
    pub assets: Vec<MaintenanceAsset>,
    pub total_cost: f64,
    pub total_percent: f64,
}

pub fn highest_maintenance(payload: &Value) -> HighestMaintenance {
    let Some(root) = first_of(payload, REPORT_ROOT) else {
        return HighestMaintenance::default();
    };
    let assets = lookup(root, &["assets_with_highest_maintenance_spend"])
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| MaintenanceAsset {
                    rank: lookup(item, &["rank"]).and_then(scalar_text).unwrap_or_default(),
                    asset_name_id: lookup(item, &["asset_name_id"])
                        .and_then(scalar_text)
                        .unwrap_or_default(),
                    asset_category: text_or(item, &["asset_category"], "-"),
                    site_name: text_or(item, &["site_name"], "-"),
                    total_maintenance_cost: coerce_opt(item.get("total_maintenance_cost")),
                    maintenance_percent: coerce_opt(item.get("maintenance_percent")),
                    remark: text_or(item, &["remark"], "-"),
                })
                .collect()
        })
        .unwrap_or_default();

    HighestMaintenance {
        assets,
        total_cost: coerce_opt(root.get("total_maintenance_cost")),
        total_percent: coerce_opt(root.get("total_maintenance_percent")),
    }
}
