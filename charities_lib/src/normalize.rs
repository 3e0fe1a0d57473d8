//! Lenient readers for raw register payloads.
//!
//! The registers populate fields inconsistently: numbers arrive as strings,
//! blanks as `""`, lists as delimited text. Every reader here maps anything
//! missing, null or blank to `None` / an empty list rather than failing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// True for the "no such record" bodies registers send with a 200: `null`,
/// empty string, `{}` or `[]`.
pub fn is_placeholder(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Trimmed, non-empty text. Numbers are rendered as text.
pub fn text(raw: &Value, key: &str) -> Option<String> {
    value_text(raw.get(key)?)
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The first key that yields text.
pub fn first_text(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(raw, key))
}

/// A money amount or other decimal. Accepts JSON numbers and strings such as
/// `"£1,234.50"`.
pub fn number(raw: &Value, key: &str) -> Option<f64> {
    match raw.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

pub fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '£' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// A non-negative whole count (people, trustees).
pub fn count(raw: &Value, key: &str) -> Option<u32> {
    let n = number(raw, key)?;
    if n < 0.0 || n > f64::from(u32::MAX) {
        return None;
    }
    Some(n.round() as u32)
}

/// A date in any of the formats the registers use.
pub fn date(raw: &Value, key: &str) -> Option<NaiveDate> {
    parse_date(&text(raw, key)?)
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// A yes/no flag. Accepts booleans, `"true"`, `"yes"`, `"y"` and `1`.
pub fn flag(raw: &Value, key: &str) -> bool {
    match raw.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "1"
        ),
        _ => false,
    }
}

/// A list of strings. Accepts an array of strings, an array of objects (read
/// through `field`), a JSON-encoded array in a string, or a `;`-separated
/// string. Blanks and duplicates are dropped; order is kept.
pub fn string_list(raw: &Value, key: &str, field: Option<&str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |item: String| {
        if !out.contains(&item) {
            out.push(item);
        }
    };
    match raw.get(key) {
        Some(Value::Array(items)) => {
            for item in items {
                let value = match (item, field) {
                    (Value::Object(_), Some(field)) => text(item, field),
                    _ => value_text(item),
                };
                if let Some(value) = value {
                    push(value);
                }
            }
        }
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.starts_with('[') {
                if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(s) {
                    items.iter().filter_map(value_text).for_each(&mut push);
                    return out;
                }
            }
            s.split(';')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .for_each(|part| push(part.to_string()));
        }
        _ => {}
    }
    out
}

/// Joins address lines with `", "`, skipping blanks.
pub fn join_lines<I>(lines: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    let parts: Vec<String> = lines.into_iter().flatten().collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// A website as given, with a scheme added when the register omits it.
pub fn website(raw: &Value, key: &str) -> Option<String> {
    let url = text(raw, key)?;
    if url.starts_with("http://") || url.starts_with("https://") {
        Some(url)
    } else {
        Some(format!("https://{}", url))
    }
}
