//! Matrix-shaped report tables (item × site, category × site, ...).
//!
//! Every builder returns a rectangular [`Grid`]: one cell per row/column pair,
//! with missing source values filled in rather than omitted.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use crate::format::{
    display_percent, format_capital_cell, format_stock_cell, normalize_aging_bucket,
    percent_to_age_band,
};
use crate::numeric::{
    coerce_number, humanize_key, js_number, parse_lenient, parse_percent, scalar_text, site_key,
    try_number,
};
use crate::payload::{first_array, first_of, first_text, lookup, text_or};
use crate::rows::MISSING_KEY;

/// Items and consumables shown in ranked grids.
pub const TOP_N: usize = 10;
/// Utilization ranges beyond this are not rendered.
pub const MAX_UTILIZATION_RANGES: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cell {
    pub primary: f64,
    pub secondary: f64,
    pub display_text: String,
    /// Colour band or other per-cell tag, when the table uses one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Cell {
    pub fn text(display_text: impl Into<String>) -> Self {
        Self {
            display_text: display_text.into(),
            ..Self::default()
        }
    }

    pub fn number(value: f64, display_text: impl Into<String>) -> Self {
        Self {
            primary: value,
            display_text: display_text.into(),
            ..Self::default()
        }
    }

    fn with_secondary(mut self, value: f64) -> Self {
        self.secondary = value;
        self
    }

    fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.tag = (!tag.is_empty()).then_some(tag);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Grid {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// Build by evaluating `cell(row, col)` for every pair, so the result is
    /// rectangular by construction.
    pub fn from_fn(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        mut cell: impl FnMut(usize, usize) -> Cell,
    ) -> Self {
        let cells: Vec<Vec<Cell>> = (0..row_labels.len())
            .map(|r| (0..col_labels.len()).map(|c| cell(r, c)).collect())
            .collect();
        Self {
            row_labels,
            col_labels,
            cells,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty() || self.col_labels.is_empty()
    }

    pub fn is_rectangular(&self) -> bool {
        self.cells.len() == self.row_labels.len()
            && self.cells.iter().all(|row| row.len() == self.col_labels.len())
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row)?.get(col)
    }
}

fn as_object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value.and_then(Value::as_object)
}

/// Descending by total, ties kept in first-seen order, truncated to `limit`.
fn rank_by_total(mut totals: Vec<(String, f64)>, limit: usize) -> Vec<String> {
    totals.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    totals.into_iter().take(limit).map(|(name, _)| name).collect()
}

/// Accumulate per-name totals, remembering first-seen order.
#[derive(Default)]
struct Totals {
    order: Vec<String>,
    sums: HashMap<String, f64>,
}

impl Totals {
    fn add(&mut self, name: &str, amount: f64) {
        match self.sums.get_mut(name) {
            Some(sum) => *sum += amount,
            None => {
                self.order.push(name.to_string());
                self.sums.insert(name.to_string(), amount);
            }
        }
    }

    fn top(self, limit: usize) -> Vec<String> {
        let Totals { order, sums } = self;
        let totals = order
            .into_iter()
            .map(|name| {
                let sum = sums.get(&name).copied().unwrap_or(0.0);
                (name, sum)
            })
            .collect();
        rank_by_total(totals, limit)
    }
}

// Inventory overstock: item × site, capital blocked and stock level per cell

const CAPITAL_FIELDS: &[&[&str]] = &[&["capital_book"], &["blocked_value"], &["capital"]];

fn overstock_cell(entry: Option<&Value>) -> Cell {
    let capital = entry.and_then(|e| first_of(e, CAPITAL_FIELDS));
    let stock = entry.and_then(|e| lookup(e, &["current_stock"]));
    Cell {
        primary: capital.map(coerce_number).unwrap_or(0.0),
        secondary: stock.map(coerce_number).unwrap_or(0.0),
        display_text: format!(
            "{} / {}",
            format_capital_cell(capital),
            format_stock_cell(stock)
        ),
        tag: None,
    }
}

/// Site columns for the matrix shape: explicit `sites`, or keys of the first
/// row whose value looks like a site cell.
fn overstock_columns(report: &Value, matrix: &[Value]) -> (Vec<String>, Vec<String>) {
    let sites: Vec<String> = lookup(report, &["sites"])
        .and_then(Value::as_array)
        .map(|s| s.iter().filter_map(scalar_text).collect())
        .unwrap_or_default();
    if !sites.is_empty() {
        let keys = sites.iter().map(|s| site_key(s)).collect();
        return (sites, keys);
    }

    let Some(first) = matrix.first().and_then(Value::as_object) else {
        return (Vec::new(), Vec::new());
    };
    let keys: Vec<String> = first
        .iter()
        .filter(|(k, v)| {
            k.as_str() != "item_name"
                && v.as_object()
                    .map(|o| o.contains_key("capital_book") || o.contains_key("current_stock"))
                    .unwrap_or(false)
        })
        .map(|(k, _)| k.clone())
        .collect();
    let labels = keys.iter().map(|k| humanize_key(k)).collect();
    (labels, keys)
}

fn overstock_from_matrix(payload: &Value) -> Option<Grid> {
    let report = first_of(
        payload,
        &[&["data", "inventory_overstock_report"], &["inventory_overstock_report"]],
    )?;
    let matrix: &[Value] = lookup(report, &["matrix_data"])
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let (sites, keys) = overstock_columns(report, matrix);
    if sites.is_empty() || matrix.is_empty() {
        return None;
    }

    let items = matrix
        .iter()
        .map(|row| text_or(row, &["item_name"], MISSING_KEY))
        .collect();
    Some(Grid::from_fn(items, sites, |r, c| {
        overstock_cell(matrix[r].get(&keys[c]))
    }))
}

fn site_items(site: &Value) -> &[Value] {
    lookup(site, &["items"])
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Rank items by blocked value summed across sites, keep the top ten and look
/// each one up again per site.
fn overstock_from_site_items(payload: &Value) -> Option<Grid> {
    let sites = first_array(
        payload,
        &[&["data", "overstock_top_items_by_site"], &["overstock_top_items_by_site"]],
    )?;
    let named: Vec<(String, &Value)> = sites
        .iter()
        .filter_map(|s| first_text(s, &["site_name"]).map(|name| (name, s)))
        .collect();
    if named.is_empty() {
        return None;
    }

    let mut totals = Totals::default();
    for (_, site) in &named {
        for item in site_items(site) {
            if let Some(name) = first_text(item, &["item_name"]) {
                let blocked = item.get("blocked_value").map(coerce_number).unwrap_or(0.0);
                totals.add(&name, blocked);
            }
        }
    }
    let items = totals.top(TOP_N);

    // Sites are matched by name, so a repeated name reads the first entry.
    let find_site = |name: &str| named.iter().find(|(n, _)| n == name).map(|(_, s)| *s);
    let columns: Vec<String> = named.iter().map(|(n, _)| n.clone()).collect();
    Some(Grid::from_fn(items.clone(), columns.clone(), |r, c| {
        let entry = find_site(&columns[c]).and_then(|site| {
            site_items(site)
                .iter()
                .find(|it| it.get("item_name").and_then(Value::as_str) == Some(items[r].as_str()))
        });
        let capital = entry.and_then(|e| lookup(e, &["capital_book"]));
        let stock = entry.and_then(|e| lookup(e, &["current_stock"]));
        Cell {
            primary: capital.map(coerce_number).unwrap_or(0.0),
            secondary: stock.map(coerce_number).unwrap_or(0.0),
            display_text: format!(
                "{} / {}",
                format_capital_cell(Some(capital.unwrap_or(&Value::from(0)))),
                format_stock_cell(Some(stock.unwrap_or(&Value::from(0))))
            ),
            tag: None,
        }
    }))
}

/// Item × site overstock grid from the matrix shape, else the per-site list shape.
pub fn build_overstock_grid(payload: &Value) -> Grid {
    let (grid, shape) = match overstock_from_matrix(payload) {
        Some(grid) => (grid, "matrix"),
        None => match overstock_from_site_items(payload) {
            Some(grid) => (grid, "site_items"),
            None => return Grid::default(),
        },
    };
    tracing::debug!(
        shape,
        rows = grid.row_labels.len(),
        cols = grid.col_labels.len(),
        "built overstock grid"
    );
    grid
}

// Centre-wise consumables: centre × top consumables

pub fn build_consumables_grid(payload: &Value) -> Grid {
    let Some(centres) = first_array(
        payload,
        &[&["data", "center_wise_consumables"], &["center_wise_consumables"]],
    ) else {
        return Grid::default();
    };

    let mut totals = Totals::default();
    for centre in centres {
        if let Some(consumables) = as_object(centre.get("consumables")) {
            for (name, value) in consumables {
                totals.add(name, coerce_number(value));
            }
        }
    }
    let headers = totals.top(TOP_N);

    let rows = centres
        .iter()
        .map(|c| text_or(c, &["site_name", "site"], MISSING_KEY))
        .collect();
    Grid::from_fn(rows, headers.clone(), |r, c| {
        let value = as_object(centres[r].get("consumables"))
            .and_then(|m| m.get(&headers[c]))
            .map(coerce_number)
            .unwrap_or(0.0);
        Cell::number(value, js_number(value))
    })
}

// Ticket performance: category × site, volume / closure with an aging band

fn metric_category(metric: &Value) -> String {
    first_text(metric, &["category_name", "category"]).unwrap_or_else(|| "Unknown".to_string())
}

fn site_name(site: &Value) -> Option<String> {
    first_text(site, &["site_name", "site"])
}

/// Key of the largest entry in an aging distribution.
fn dominant_bucket(distribution: &Map<String, Value>) -> Option<&str> {
    let mut best: Option<(&str, f64)> = None;
    for (key, value) in distribution {
        let n = match value {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            other => scalar_text(other)
                .and_then(|s| parse_lenient(&s.replace('-', "")))
                .unwrap_or(0.0),
        };
        if best.map_or(true, |(_, max)| n > max) {
            best = Some((key.as_str(), n));
        }
    }
    best.map(|(k, _)| k)
}

fn ticket_cell(site: Option<&Value>) -> Cell {
    let Some(site) = site else {
        return Cell::text("");
    };
    let aging = as_object(site.get("aging_distribution"))
        .and_then(dominant_bucket)
        .map(normalize_aging_bucket)
        .unwrap_or_default();

    let volume = first_of(
        site,
        &[&["total_ticket_percentage"], &["volume_percentage"], &["volume"]],
    );
    let closure = first_of(site, &[&["closed_ticket_percentage"], &["closure_rate_percentage"]]);

    let band = volume
        .and_then(percent_to_age_band)
        .or_else(|| closure.and_then(percent_to_age_band))
        .map(|b| b.to_string())
        .unwrap_or(aging);

    let volume_text = volume.map(display_percent).unwrap_or_default();
    let closure_text = closure.map(display_percent).unwrap_or_default();
    Cell::number(
        volume.map(coerce_number).unwrap_or(0.0),
        format!("{volume_text} / {closure_text}"),
    )
    .with_secondary(closure.map(coerce_number).unwrap_or(0.0))
    .with_tag(band)
}

/// Category rows in API order; site columns unique in first-seen order.
pub fn build_ticket_grid(payload: &Value) -> Grid {
    let Some(metrics) = first_of(payload, &[&["data", "metrics"], &["metrics"]])
        .and_then(Value::as_array)
        .filter(|m| !m.is_empty())
    else {
        return Grid::default();
    };

    let categories: Vec<String> = metrics.iter().map(metric_category).collect();
    let mut seen = HashSet::new();
    let sites: Vec<String> = metrics
        .iter()
        .filter_map(|m| lookup(m, &["sites"]).and_then(Value::as_array))
        .flatten()
        .filter_map(site_name)
        .filter(|s| seen.insert(s.clone()))
        .collect();

    Grid::from_fn(categories.clone(), sites.clone(), |r, c| {
        let metric = metrics.iter().find(|m| metric_category(m) == categories[r]);
        let site = metric
            .and_then(|m| lookup(m, &["sites"]))
            .and_then(Value::as_array)
            .and_then(|list| list.iter().find(|s| site_name(s).as_deref() == Some(sites[c].as_str())));
        ticket_cell(site)
    })
}

// Top overdue checklists: site × category, whole percent

pub fn build_overdue_grid(payload: &Value) -> Grid {
    let Some(root) = first_of(
        payload,
        &[&["data", "top_10_overdue_checklists"], &["top_10_overdue_checklists"]],
    )
    .filter(|r| r.is_object()) else {
        return Grid::default();
    };

    let categories: Vec<String> = lookup(root, &["categories"])
        .and_then(Value::as_array)
        .map(|c| c.iter().filter_map(scalar_text).collect())
        .unwrap_or_default();
    let sites: &[Value] = lookup(root, &["site_wise"])
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    if categories.is_empty() || sites.is_empty() {
        return Grid::default();
    }

    let by_category: Vec<HashMap<&str, f64>> = sites
        .iter()
        .map(|site| {
            lookup(site, &["categories"])
                .and_then(Value::as_array)
                .map(|entries| {
                    entries
                        .iter()
                        .filter_map(|e| {
                            let name = e.get("category")?.as_str()?;
                            let pct = e.get("overdue_percentage").map(coerce_number);
                            Some((name, pct.unwrap_or(0.0)))
                        })
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect();

    let rows = sites
        .iter()
        .map(|s| text_or(s, &["site_name"], MISSING_KEY))
        .collect();
    Grid::from_fn(rows, categories.clone(), |r, c| {
        let pct = by_category[r].get(categories[c].as_str()).copied().unwrap_or(0.0);
        Cell::number(pct, format!("{:.0}%", pct))
    })
}

// Customer rating: rating band × site

const RATING_ROWS: [(&str, &str); 6] = [
    ("excellent", "Excellent"),
    ("good", "Good"),
    ("average", "Average"),
    ("bad", "Bad"),
    ("poor", "Poor"),
    ("total_percentage", "Total %"),
];

pub fn build_rating_grid(payload: &Value) -> Grid {
    let Some(sites) = lookup(payload, &["data", "site_performance", "data"]).and_then(Value::as_array)
    else {
        return Grid::default();
    };
    let columns = sites
        .iter()
        .map(|s| text_or(s, &["site_name"], MISSING_KEY))
        .collect();
    let rows = RATING_ROWS.iter().map(|(_, label)| label.to_string()).collect();
    Grid::from_fn(rows, columns, |r, c| {
        let value = lookup(&sites[c], &[RATING_ROWS[r].0]);
        let text = value.and_then(scalar_text).unwrap_or_else(|| "0%".to_string());
        Cell::number(value.and_then(parse_percent).unwrap_or(0.0), text)
    })
}

// Ticket aging and closure efficiency: bucket × centre

const AGING_ROWS: [(&str, &str); 5] = [
    ("40+_days", "40+ days"),
    ("31-40_days", "31-40 days"),
    ("21-30_days", "21-30 days"),
    ("11-20_days", "11-20 days"),
    ("0-10_days", "0-10 days"),
];

/// Aging bucket rows followed by closure efficiency and feedback rows.
pub fn build_aging_closure_grid(payload: &Value) -> Grid {
    let Some(centers) = lookup(payload, &["data", "centers"]).and_then(Value::as_array) else {
        return Grid::default();
    };
    let columns = centers
        .iter()
        .map(|c| text_or(c, &["center_name"], MISSING_KEY))
        .collect();
    let mut rows: Vec<String> = AGING_ROWS.iter().map(|(_, label)| label.to_string()).collect();
    rows.extend(
        ["Total Closure %", "No. of response", "% of Response"]
            .iter()
            .map(|s| s.to_string()),
    );

    let text_cell = |value: Option<&Value>| match value {
        Some(v) => Cell::number(coerce_number(v), scalar_text(v).unwrap_or_else(|| "-".to_string())),
        None => Cell::text("-"),
    };

    Grid::from_fn(rows, columns, |r, c| {
        let center = &centers[c];
        match r {
            r if r < AGING_ROWS.len() => text_cell(lookup(center, &["aging_buckets", AGING_ROWS[r].0])),
            5 => text_cell(lookup(center, &["total_closure_efficiency"])),
            6 => text_cell(lookup(center, &["feedback_metrics", "response_count"])),
            _ => match lookup(center, &["feedback_metrics", "response_percentage"]) {
                Some(v) => {
                    let pct = coerce_number(v);
                    Cell::number(pct, format!("{:.2}%", pct))
                }
                None => Cell::text("-"),
            },
        }
    })
}

// Meeting room utilization: centre × utilization range

/// Bounds for a range label: `"Less 30%"` is open below, `"30%-39%"` is
/// inclusive, a single number is a point range, anything else matches all.
pub fn parse_range(label: &str) -> (f64, f64) {
    if let Ok(re) = Regex::new(r"(?i)less\s*(\d+)%?") {
        if let Some(max) = re
            .captures(label)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
        {
            return (f64::NEG_INFINITY, max);
        }
    }
    if let Ok(re) = Regex::new(r"(\d+)[^\d]*(\d+)?") {
        if let Some(caps) = re.captures(label) {
            let a = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok());
            let b = caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok());
            if let Some(a) = a {
                return (a, b.unwrap_or(a));
            }
        }
    }
    (f64::NEG_INFINITY, f64::INFINITY)
}

fn rooms_in_range(center: &Value, (min, max): (f64, f64)) -> Vec<String> {
    lookup(center, &["rooms"])
        .and_then(Value::as_array)
        .map(|rooms| {
            rooms
                .iter()
                .filter(|room| {
                    first_of(
                        room,
                        &[&["utilization_percentage"], &["utilization_percentage_percentage"]],
                    )
                    .and_then(try_number)
                    .map(|pct| pct >= min && pct <= max)
                    .unwrap_or(false)
                })
                .filter_map(|room| first_text(room, &["room_name"]))
                .collect()
        })
        .unwrap_or_default()
}

pub fn build_utilization_grid(payload: &Value) -> Grid {
    let centers: &[Value] = first_array(
        payload,
        &[&["data", "center_utilization_data"], &["center_utilization_data"]],
    )
    .map(Vec::as_slice)
    .unwrap_or(&[]);
    let ranges: Vec<String> = first_of(payload, &[&["data", "utilization_ranges"], &["utilization_ranges"]])
        .and_then(Value::as_object)
        .map(|r| r.keys().take(MAX_UTILIZATION_RANGES).cloned().collect())
        .unwrap_or_default();

    let rows = centers
        .iter()
        .map(|c| text_or(c, &["center_name", "site_name"], MISSING_KEY))
        .collect();
    let bounds: Vec<(f64, f64)> = ranges.iter().map(|r| parse_range(r)).collect();
    Grid::from_fn(rows, ranges, |r, c| {
        let rooms = rooms_in_range(&centers[r], bounds[c]);
        Cell::number(rooms.len() as f64, rooms.join(", "))
    })
}
