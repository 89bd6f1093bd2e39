//! Defensive probing of report payloads whose shape is not under our control.
//!
//! Every endpoint has been served as `{data: {section: ...}}`, `{section: ...}`
//! and sometimes a bare list. Lookups here treat `null` the same as absent so
//! a fallback chain moves on to the next candidate.

use serde_json::{Map, Value};

use crate::numeric::{coerce_number, scalar_text};

/// A candidate location inside a payload, as a list of object keys.
pub type Path<'a> = &'a [&'a str];

/// Follow `path` from `value`; `None` if any hop is missing or the target is null.
/// The empty path returns `value` itself.
pub fn lookup<'a>(value: &'a Value, path: Path<'_>) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// First non-null value among `paths`, in order.
pub fn first_of<'a>(value: &'a Value, paths: &[Path<'_>]) -> Option<&'a Value> {
    paths.iter().find_map(|p| lookup(value, p))
}

/// First candidate that is a list.
pub fn first_array<'a>(value: &'a Value, paths: &[Path<'_>]) -> Option<&'a Vec<Value>> {
    paths.iter().find_map(|p| lookup(value, p).and_then(Value::as_array))
}

/// First candidate that is an object.
pub fn first_object<'a>(value: &'a Value, paths: &[Path<'_>]) -> Option<&'a Map<String, Value>> {
    paths.iter().find_map(|p| lookup(value, p).and_then(Value::as_object))
}

/// First alias holding a truthy scalar (non-empty string, non-zero number),
/// stringified.
pub fn first_text(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        let value = item.get(*k)?;
        match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => scalar_text(value),
            Value::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    })
}

/// [`first_text`] with a default, `'-'` for display keys.
pub fn text_or(item: &Value, keys: &[&str], default: &str) -> String {
    first_text(item, keys).unwrap_or_else(|| default.to_string())
}

/// First non-null alias path, coerced to a number; `0.0` when exhausted.
pub fn number_at(item: &Value, paths: &[Path<'_>]) -> f64 {
    first_of(item, paths).map(coerce_number).unwrap_or(0.0)
}

/// Named payload interpretation, tried in priority order by [`adapt`].
pub struct ShapeAdapter<T> {
    pub name: &'static str,
    pub apply: fn(&Value) -> Option<T>,
}

impl<T> ShapeAdapter<T> {
    pub const fn new(name: &'static str, apply: fn(&Value) -> Option<T>) -> Self {
        Self { name, apply }
    }
}

/// Run adapters in order and return the first match.
pub fn adapt<T>(section: &str, payload: &Value, adapters: &[ShapeAdapter<T>]) -> Option<T> {
    for adapter in adapters {
        if let Some(out) = (adapter.apply)(payload) {
            tracing::debug!(section, shape = adapter.name, "payload shape matched");
            return Some(out);
        }
    }
    if !payload.is_null() {
        tracing::debug!(section, "no payload shape matched");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_skips_null() {
        let v = json!({"data": {"x": null, "y": [1]}});
        assert!(lookup(&v, &["data", "x"]).is_none());
        assert!(lookup(&v, &["data", "y"]).is_some());
        assert!(lookup(&v, &["data", "y", "z"]).is_none());
        assert_eq!(lookup(&v, &[]), Some(&v));
    }

    #[test]
    fn test_first_array_priority() {
        let v = json!({"data": {"rows": {"not": "a list"}}, "rows": [1, 2]});
        let arr = first_array(&v, &[&["data", "rows"], &["rows"]]).unwrap();
        assert_eq!(arr.len(), 2);
        assert!(first_array(&json!({}), &[&["rows"]]).is_none());
    }

    #[test]
    fn test_first_text_falls_through_blank() {
        let item = json!({"site_name": "", "center_name": "Powai", "site": "x"});
        assert_eq!(first_text(&item, &["site_name", "center_name", "site"]).as_deref(), Some("Powai"));
        assert_eq!(text_or(&json!({}), &["site_name"], "-"), "-");
        assert_eq!(text_or(&json!({"site": 42}), &["site"], "-"), "42");
    }

    #[test]
    fn test_number_at_alias_order() {
        let item = json!({"a": null, "b": "7", "c": 9});
        assert_eq!(number_at(&item, &[&["a"], &["b"], &["c"]]), 7.0);
        assert_eq!(number_at(&item, &[&["missing"]]), 0.0);
    }

    #[test]
    fn test_adapt_takes_first_match() {
        fn never(_: &Value) -> Option<u32> {
            None
        }
        fn always(_: &Value) -> Option<u32> {
            Some(2)
        }
        let adapters = [ShapeAdapter::new("never", never), ShapeAdapter::new("always", always)];
        assert_eq!(adapt("test", &json!({}), &adapters), Some(2));
        assert_eq!(adapt("test", &json!({}), &adapters[..1]), None);
    }
}
