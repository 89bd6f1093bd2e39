//! Permissive numeric coercion for loosely-typed report payloads.
//!
//! Report endpoints send the same metric as `12`, `"12"`, `"12%"` or `"₹ 12,000"`
//! depending on the backend version. Everything here strips the decoration and
//! falls back to zero (or `None` for the `try_` variants) instead of failing.

use serde_json::Value;

/// Strip every character outside `[0-9.-]` and parse the longest decimal prefix.
///
/// `"₹ 1,20,000.50"` -> `120000.5`, `"38.46%"` -> `38.46`, `"1.2.3"` -> `1.2`,
/// `"abc"` -> `None`.
pub fn parse_lenient(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let bytes = cleaned.as_bytes();

    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        let frac_digits = frac_end - frac_start;
        if digits > 0 || frac_digits > 0 {
            end = frac_end;
            digits += frac_digits;
        }
    }

    if digits == 0 {
        return None;
    }
    cleaned[..end].parse::<f64>().ok()
}

/// Coerce any JSON value to a number, defaulting to `0.0`.
pub fn coerce_number(value: &Value) -> f64 {
    try_number(value).unwrap_or(0.0)
}

/// Like [`coerce_number`] but keeps "no usable number" distinguishable from zero.
pub fn try_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_lenient(s),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Coerce an optional value; absent means zero.
pub fn coerce_opt(value: Option<&Value>) -> f64 {
    value.map(coerce_number).unwrap_or(0.0)
}

/// Parse a percentage given as a number or a string like `"38.46%"`.
pub fn parse_percent(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_lenient(s),
        _ => None,
    }
}

/// Parse a humanized amount such as `"12k"` or `"1.5L"` into plain units.
///
/// Lakh (`l`) scales by 100 000 and thousand (`k`) by 1 000. Anything else is
/// taken as already being in units.
pub fn parse_scaled_amount(value: &Value) -> f64 {
    let text = match value {
        Value::Null => return 0.0,
        Value::String(s) => s.trim().to_lowercase(),
        other => other.to_string(),
    };
    let Some(num) = parse_lenient(&text) else {
        return 0.0;
    };
    if text.contains('l') {
        num * 100_000.0
    } else if text.contains('k') {
        num * 1_000.0
    } else {
        num
    }
}

/// Lowercase a display name and collapse non-alphanumeric runs to `_`.
///
/// `"Bandra Kurla (BKC)"` -> `"bandra_kurla_bkc"`.
pub fn site_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }
    out
}

/// `"andheri_east"` -> `"Andheri East"`.
pub fn humanize_key(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut prev_word = false;
    for ch in spaced.chars() {
        let is_word = ch.is_alphanumeric();
        if is_word && !prev_word {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        prev_word = is_word;
    }
    out
}

/// Render a number the way the console prints it: no trailing `.0` on integers.
pub fn js_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Stringify a scalar JSON value without quotes; `None` for null/containers.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n.as_f64().map(js_number),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_lenient_strips_decoration() {
        assert_eq!(parse_lenient("₹ 1,20,000.50"), Some(120000.5));
        assert_eq!(parse_lenient("38.46%"), Some(38.46));
        assert_eq!(parse_lenient("-12"), Some(-12.0));
        assert_eq!(parse_lenient(".5"), Some(0.5));
    }

    #[test]
    fn test_parse_lenient_prefix_only() {
        assert_eq!(parse_lenient("1.2.3"), Some(1.2));
        assert_eq!(parse_lenient("10-20"), Some(10.0));
    }

    #[test]
    fn test_parse_lenient_failures() {
        assert_eq!(parse_lenient("abc"), None);
        assert_eq!(parse_lenient("-"), None);
        assert_eq!(parse_lenient("."), None);
        assert_eq!(parse_lenient("--5"), None);
        assert_eq!(parse_lenient(""), None);
    }

    #[test]
    fn test_coerce_number_defaults_to_zero() {
        assert_eq!(coerce_number(&json!(3)), 3.0);
        assert_eq!(coerce_number(&json!("4.5")), 4.5);
        assert_eq!(coerce_number(&json!("n/a")), 0.0);
        assert_eq!(coerce_number(&json!(null)), 0.0);
        assert_eq!(coerce_number(&json!({"a": 1})), 0.0);
        assert_eq!(coerce_number(&json!(true)), 1.0);
        assert_eq!(try_number(&json!("n/a")), None);
    }

    #[test]
    fn test_parse_scaled_amount() {
        assert_eq!(parse_scaled_amount(&json!("12k")), 12_000.0);
        assert_eq!(parse_scaled_amount(&json!("1.5L")), 150_000.0);
        assert_eq!(parse_scaled_amount(&json!(42)), 42.0);
        assert_eq!(parse_scaled_amount(&json!("junk")), 0.0);
    }

    #[test]
    fn test_site_key_and_humanize() {
        assert_eq!(site_key("Bandra Kurla (BKC)"), "bandra_kurla_bkc");
        assert_eq!(site_key("  --Powai--  "), "powai");
        assert_eq!(humanize_key("andheri_east"), "Andheri East");
        assert_eq!(humanize_key("site_2b"), "Site 2b");
    }

    #[test]
    fn test_js_number() {
        assert_eq!(js_number(999.0), "999");
        assert_eq!(js_number(1.5), "1.5");
        assert_eq!(js_number(-3.0), "-3");
    }
}
