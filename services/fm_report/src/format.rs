//! Display formatting for report cells: currency, compact numbers, percents
//! and aging bands.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::numeric::{coerce_number, js_number, parse_lenient, parse_percent, scalar_text};

pub const RUPEE: char = '₹';

/// Group an amount the en-IN way (`12,34,567.891`), keeping up to 3 decimals.
pub fn group_indian(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value.abs() * 1000.0).round() / 1000.0;
    let negative = value < 0.0 && rounded != 0.0;

    let fixed = format!("{:.3}", rounded);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    if digits.len() <= 3 {
        grouped.push_str(int_part);
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut head_groups: Vec<String> = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            head_groups.push(head[start..end].iter().collect());
            end = start;
        }
        head_groups.reverse();
        grouped.push_str(&head_groups.join(","));
        grouped.push(',');
        grouped.extend(tail.iter());
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Render a currency amount as `"₹ 1,20,000"`.
///
/// Strings that already carry the glyph are re-emitted with normalized spacing
/// rather than re-parsed. Anything unusable renders as `"₹ 0"`.
pub fn format_currency(value: &Value) -> String {
    match value {
        Value::Null => format!("{RUPEE} 0"),
        Value::String(s) => {
            let s = s.trim();
            if let Some(rest) = s.strip_prefix(RUPEE) {
                return format!("{RUPEE} {}", rest.trim());
            }
            match parse_lenient(s) {
                Some(n) => format!("{RUPEE} {}", group_indian(n)),
                None => format!("{RUPEE} 0"),
            }
        }
        Value::Number(n) => format!("{RUPEE} {}", group_indian(n.as_f64().unwrap_or(0.0))),
        Value::Bool(b) => format!("{RUPEE} {}", if *b { 1 } else { 0 }),
        _ => format!("{RUPEE} 0"),
    }
}

/// Compact a number with a single `k` tier.
///
/// Below 1000 the plain number is returned; otherwise the value is divided by
/// 1000, rounded to one decimal and suffixed with `k` (`1500` -> `"1.5k"`,
/// `2000000` -> `"2000k"`). There is no `M`/`B` tier.
pub fn format_compact_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return "0".to_string();
    }
    if amount < 1000.0 {
        return js_number(amount);
    }
    let scaled = amount / 1000.0;
    let rounded = (scaled * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}k", js_number(rounded))
    } else {
        format!("{:.1}k", rounded)
    }
}

pub fn format_compact(value: &Value) -> String {
    format_compact_amount(coerce_number(value))
}

/// Append `%` unless the value already ends with one. Null or blank -> `""`.
pub fn display_percent(value: &Value) -> String {
    let Some(text) = scalar_text(value) else {
        return String::new();
    };
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }
    if text.ends_with('%') {
        text.to_string()
    } else {
        format!("{text}%")
    }
}

/// Capital/value text for a grid cell.
///
/// Upstream already humanizes these (`"4"`, `"12k"`, `"1L"`), so the trimmed
/// text is shown as sent; blank input becomes `"-"`.
pub fn format_capital_cell(value: Option<&Value>) -> String {
    match value.and_then(scalar_text) {
        Some(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => "-".to_string(),
    }
}

/// Stock/percentage text for a grid cell: exactly one trailing `%`.
pub fn format_stock_cell(value: Option<&Value>) -> String {
    let Some(text) = value.and_then(scalar_text) else {
        return "-".to_string();
    };
    let text = text.trim().trim_end_matches('%');
    if text.is_empty() {
        return "-".to_string();
    }
    format!("{text}%")
}

/// `12` -> `"12%"`, `12.345` -> `"12.35%"`, junk -> `"0%"`.
pub fn format_whole_percent(value: &Value) -> String {
    let n = percent_number(value);
    if n.fract() == 0.0 {
        format!("{}%", js_number(n))
    } else {
        format!("{:.2}%", n)
    }
}

/// Signed percent change: `0` -> `"0%"`, `1.5` -> `"+1.50%"`, `-2` -> `"-2%"`.
pub fn format_percent_delta(value: &Value) -> String {
    let n = percent_number(value);
    if n == 0.0 {
        return "0%".to_string();
    }
    let abs = n.abs();
    let base = if abs.fract() == 0.0 {
        format!("{}%", js_number(abs))
    } else {
        format!("{:.2}%", abs)
    };
    if n > 0.0 {
        format!("+{base}")
    } else {
        format!("-{base}")
    }
}

fn percent_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_lenient(&s.trim().replace('%', "")).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// One of the five fixed aging bands used to colour ticket and checklist cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgingBand {
    #[serde(rename = "0-10")]
    UpTo10,
    #[serde(rename = "11-20")]
    UpTo20,
    #[serde(rename = "21-30")]
    UpTo30,
    #[serde(rename = "31-40")]
    UpTo40,
    #[serde(rename = "40+")]
    Over40,
}

impl AgingBand {
    pub const ALL: [AgingBand; 5] = [
        AgingBand::UpTo10,
        AgingBand::UpTo20,
        AgingBand::UpTo30,
        AgingBand::UpTo40,
        AgingBand::Over40,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgingBand::UpTo10 => "0-10",
            AgingBand::UpTo20 => "11-20",
            AgingBand::UpTo30 => "21-30",
            AgingBand::UpTo40 => "31-40",
            AgingBand::Over40 => "40+",
        }
    }

    /// Band for a percentage; non-finite input has no band.
    pub fn for_percent(percent: f64) -> Option<Self> {
        if !percent.is_finite() {
            return None;
        }
        Some(if percent <= 10.0 {
            AgingBand::UpTo10
        } else if percent <= 20.0 {
            AgingBand::UpTo20
        } else if percent <= 30.0 {
            AgingBand::UpTo30
        } else if percent <= 40.0 {
            AgingBand::UpTo40
        } else {
            AgingBand::Over40
        })
    }

}

impl fmt::Display for AgingBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band for a number or percent string (`"38.46%"`); `None` if unparseable.
pub fn percent_to_age_band(value: &Value) -> Option<AgingBand> {
    parse_percent(value).and_then(AgingBand::for_percent)
}

/// Canonicalize the aging bucket spellings different API versions use.
///
/// `"0_10"`, `"0-10 days"`, `"0 to 10"` -> `"0-10"`; `"40_plus"`, `"40+_days"`,
/// `"above 40"` -> `"40+"`. Unrecognised labels come back in cleaned form.
pub fn normalize_aging_bucket(label: &str) -> String {
    if label.is_empty() {
        return String::new();
    }
    let mut s = label.to_lowercase();
    if let Ok(re) = Regex::new(r"days?") {
        s = re.replace_all(&s, "").to_string();
    }
    s.retain(|c| !c.is_whitespace());
    if let Ok(re) = Regex::new(r"(\d)to(\d)") {
        s = re.replace_all(&s, "$1-$2").to_string();
    }
    s = s.replace('_', "-");

    if s.contains("40")
        && (s.contains('+') || s.contains("plus") || s.contains("above") || s.contains("more"))
    {
        return "40+".to_string();
    }

    if let Some(band) = AgingBand::ALL.into_iter().find(|b| b.as_str() == s) {
        return band.to_string();
    }

    if let Ok(re) = Regex::new(r"(\d+)-(\d+)") {
        if let Some(caps) = re.captures(&s) {
            let a = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
            let b = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
            match (a, b) {
                (Some(0), Some(10)) => return "0-10".to_string(),
                (Some(11), Some(20)) => return "11-20".to_string(),
                (Some(21), Some(30)) => return "21-30".to_string(),
                (Some(31), Some(40)) => return "31-40".to_string(),
                _ => {}
            }
        }
    }

    s
}
