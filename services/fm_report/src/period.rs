use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ReportError, Result};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Comparison unit a report's date range falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodUnit {
    Week,
    Month,
    Quarter,
    Year,
}

impl PeriodUnit {
    /// Bucket a day span. `None` (unparseable dates) lands in `Year`.
    pub fn for_days(days: Option<i64>) -> Self {
        match days.map(|d| d.max(0)) {
            Some(d) if d <= 7 => PeriodUnit::Week,
            Some(d) if d <= 31 => PeriodUnit::Month,
            Some(d) if d <= 92 => PeriodUnit::Quarter,
            _ => PeriodUnit::Year,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodUnit::Week => "Week",
            PeriodUnit::Month => "Month",
            PeriodUnit::Quarter => "Quarter",
            PeriodUnit::Year => "Year",
        }
    }

    /// Adjective used in section titles ("Quarterly Comparison").
    pub fn adjective(&self) -> &'static str {
        match self {
            PeriodUnit::Week => "Weekly",
            PeriodUnit::Month => "Monthly",
            PeriodUnit::Quarter => "Quarterly",
            PeriodUnit::Year => "Yearly",
        }
    }
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodInfo {
    pub unit: PeriodUnit,
    pub period_label: String,
    pub last_label: String,
    pub current_label: String,
}

impl PeriodInfo {
    pub fn for_unit(unit: PeriodUnit) -> Self {
        Self {
            unit,
            period_label: unit.adjective().to_string(),
            last_label: format!("Last {unit}"),
            current_label: format!("Current {unit}"),
        }
    }
}

/// Report date range as received from query parameters.
///
/// Unparseable sides are kept as `None` rather than rejected; the raw text is
/// retained for labels and for the request query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start_raw: String,
    pub end_raw: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl DateRange {
    pub fn parse(start: &str, end: &str) -> Self {
        Self {
            start_raw: start.to_string(),
            end_raw: end.to_string(),
            start: parse_moment(start),
            end: parse_moment(end),
        }
    }

    /// Whole days between start and end, rounded. Negative for inverted ranges.
    pub fn day_span(&self) -> Option<i64> {
        let (start, end) = (self.start?, self.end?);
        let secs = (end - start).num_seconds() as f64;
        Some((secs / SECONDS_PER_DAY).round() as i64)
    }

    /// Strict check: both dates parse and `start <= end`.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| ReportError::InvalidDateRange {
            start: self.start_raw.clone(),
            end: self.end_raw.clone(),
            reason: reason.to_string(),
        };
        let start = self.start.ok_or_else(|| invalid("unparseable start date"))?;
        let end = self.end.ok_or_else(|| invalid("unparseable end date"))?;
        if end < start {
            return Err(invalid("end date is before start date"));
        }
        Ok(())
    }

    /// `"15 Jan 2025 to 15 Feb 2025"`, or the raw strings if either side is bad.
    pub fn label(&self) -> String {
        if self.start_raw.is_empty() || self.end_raw.is_empty() {
            return String::new();
        }
        match (self.start, self.end) {
            (Some(s), Some(e)) => format!("{} to {}", s.format("%d %b %Y"), e.format("%d %b %Y")),
            _ => format!("{} to {}", self.start_raw, self.end_raw),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_raw, self.end_raw)
    }
}

/// Classify a date range into its comparison period.
pub fn classify(range: &DateRange) -> PeriodInfo {
    let days = range.day_span();
    let unit = PeriodUnit::for_days(days);
    tracing::debug!(range = %range, ?days, unit = %unit, "classified report period");
    PeriodInfo::for_unit(unit)
}

/// Convenience wrapper over [`DateRange::parse`] + [`classify`].
pub fn classify_strs(start: &str, end: &str) -> PeriodInfo {
    classify(&DateRange::parse(start, end))
}

/// Days from `today` until the date in `text`; `None` if it does not parse.
pub fn days_until(text: &str, today: NaiveDate) -> Option<i64> {
    let date = parse_moment(text)?.date();
    Some((date - today).num_days())
}

fn parse_moment(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    None
}
