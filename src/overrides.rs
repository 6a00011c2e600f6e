//! Raw string values and dotted paths.
//!
//! Values coming from the command line or the environment are plain strings.
//! [`parse_raw`] turns one into the JSON value its setting declares, and
//! [`set_path`] places a value into a document by path segments.

use serde_json::{Map, Value};

use crate::setting::SettingDef;
use crate::types::ValueType;

/// Write `value` at `segments` inside `map`, creating intermediate objects
/// as needed. An intermediate key that holds a non-object is replaced.
pub fn set_path(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    let Some((leaf, path)) = segments.split_last() else {
        return;
    };
    let mut current = map;
    for segment in path {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(inner) = slot else {
            return;
        };
        current = inner;
    }
    current.insert(leaf.to_string(), value);
}

/// Read the value at `segments`, if every step exists.
pub fn get_path<'a>(map: &'a Map<String, Value>, segments: &[&str]) -> Option<&'a Value> {
    let (leaf, path) = segments.split_last()?;
    let mut current = map;
    for segment in path {
        current = current.get(*segment)?.as_object()?;
    }
    current.get(*leaf)
}

/// Parse a raw string into the JSON shape `def` declares, then check it
/// against the declared options. Returns a reason on failure.
///
/// - `null` (any case) is accepted for nullable settings.
/// - Booleans accept `true`/`false`, `yes`/`no`, `on`/`off` and `1`/`0`.
/// - String lists accept a JSON array or a comma-separated list.
pub fn parse_raw(def: &SettingDef, raw: &str) -> Result<Value, String> {
    let trimmed = raw.trim();
    if def.nullable() && trimmed.eq_ignore_ascii_case("null") {
        return Ok(Value::Null);
    }
    let value = match def.value_type() {
        ValueType::String => Value::String(raw.to_string()),
        ValueType::Integer => trimmed
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("'{raw}' is not an integer"))?,
        ValueType::Float => trimmed
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("'{raw}' is not a number"))?,
        ValueType::Boolean => Value::Bool(parse_bool(trimmed).ok_or_else(|| {
            format!("'{raw}' is not a boolean (use true/false)")
        })?),
        ValueType::StringList => parse_list(trimmed)?,
    };
    def.check(&value)?;
    Ok(value)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_list(s: &str) -> Result<Value, String> {
    if s.starts_with('[') {
        let items: Vec<String> =
            serde_json::from_str(s).map_err(|e| format!("invalid list '{s}': {e}"))?;
        return Ok(Value::Array(items.into_iter().map(Value::String).collect()));
    }
    Ok(Value::Array(
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| Value::String(item.to_string()))
            .collect(),
    ))
}
