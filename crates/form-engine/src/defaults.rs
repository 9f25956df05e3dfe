//! Default form data computed from `default` keywords.

use crate::adapter::{ADDITIONAL_ITEMS, ITEMS, PROPERTIES};
use serde_json::{Map, Value};

/// Deep-merges `right` into `left`.
///
/// Nested objects merge recursively. Arrays are concatenated when
/// `concat_arrays` is set and otherwise replaced, like every other value.
///
/// ```
/// use form_engine::merge_objects;
/// use serde_json::json;
///
/// let left = json!({"a": {"x": 1, "y": [1]}, "b": 1});
/// let right = json!({"a": {"y": [2]}, "c": 3});
/// assert_eq!(
///     merge_objects(&left, &right, true),
///     json!({"a": {"x": 1, "y": [1, 2]}, "b": 1, "c": 3})
/// );
/// ```
pub fn merge_objects(left: &Value, right: &Value, concat_arrays: bool) -> Value {
    let Value::Object(right_map) = right else {
        return right.clone();
    };
    let mut out = match left {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    for (key, right_value) in right_map {
        let left_value = out.get(key);
        let merged = match (left_value, right_value) {
            (Some(left_value), Value::Object(_)) => merge_objects(left_value, right_value, concat_arrays),
            (Some(Value::Array(l)), Value::Array(r)) if concat_arrays => {
                Value::Array(l.iter().chain(r.iter()).cloned().collect())
            }
            _ => right_value.clone(),
        };
        out.insert(key.clone(), merged);
    }
    Value::Object(out)
}

fn schema_type(schema: &Value) -> Option<&str> {
    schema.get("type").and_then(Value::as_str)
}

fn is_fixed_items(schema: &Value) -> bool {
    matches!(
        schema.get(ITEMS),
        Some(Value::Array(items)) if !items.is_empty() && items.iter().all(Value::is_object)
    )
}

fn is_multi_select(schema: &Value) -> bool {
    let Some(items) = schema.get(ITEMS) else {
        return false;
    };
    schema.get("uniqueItems").and_then(Value::as_bool) == Some(true)
        && (items.get("enum").is_some_and(Value::is_array)
            || items.get("oneOf").is_some_and(Value::is_array))
}

/// Defaults of one schema node, seeded with the defaults inherited from the
/// parent. `None` when nothing is known.
pub fn compute_defaults(schema: &Value, inherited: Option<Value>) -> Option<Value> {
    let own = schema.get("default");
    let defaults = match (inherited, own) {
        (Some(parent @ Value::Object(_)), Some(own @ Value::Object(_))) => {
            Some(merge_objects(&parent, own, false))
        }
        (_, Some(own)) => Some(own.clone()),
        (inherited, None) if is_fixed_items(schema) => {
            let items = schema.get(ITEMS).and_then(Value::as_array);
            match items {
                Some(items) => Some(Value::Array(
                    items
                        .iter()
                        .map(|item| compute_defaults(item, None).unwrap_or(Value::Null))
                        .collect(),
                )),
                None => inherited,
            }
        }
        (inherited, None) => inherited,
    };

    match schema_type(schema) {
        Some("object") => {
            let mut out = Map::new();
            if let Some(Value::Object(properties)) = schema.get(PROPERTIES) {
                for (name, property) in properties {
                    let inherited = defaults.as_ref().and_then(|d| d.get(name)).cloned();
                    if let Some(value) = compute_defaults(property, inherited) {
                        out.insert(name.clone(), value);
                    }
                }
            }
            Some(Value::Object(out))
        }
        Some("array") => {
            let min_items = schema.get("minItems").and_then(Value::as_u64).unwrap_or(0) as usize;
            if min_items == 0 {
                return defaults;
            }
            if is_multi_select(schema) {
                return Some(Value::Array(Vec::new()));
            }
            let mut entries = match defaults {
                Some(Value::Array(entries)) => entries,
                _ => Vec::new(),
            };
            if min_items > entries.len() {
                let filler_schema = if schema.get(ITEMS).is_some_and(Value::is_array) {
                    schema.get(ADDITIONAL_ITEMS)
                } else {
                    schema.get(ITEMS)
                };
                let filler = filler_schema
                    .and_then(|s| compute_defaults(s, None))
                    .unwrap_or(Value::Null);
                entries.resize(min_items, filler);
            }
            Some(Value::Array(entries))
        }
        _ => defaults,
    }
}

/// Form data for `schema`: its defaults with `form_data` merged on top.
///
/// ```
/// use form_engine::default_form_state;
/// use serde_json::json;
///
/// let schema = json!({"type": "object", "properties": {
///     "a": {"type": "string", "default": "x"},
///     "b": {"type": "number"}
/// }});
/// assert_eq!(default_form_state(&schema, None), json!({"a": "x"}));
/// assert_eq!(
///     default_form_state(&schema, Some(&json!({"b": 2}))),
///     json!({"a": "x", "b": 2})
/// );
/// ```
pub fn default_form_state(schema: &Value, form_data: Option<&Value>) -> Value {
    let defaults = compute_defaults(schema, schema.get("default").cloned());
    match form_data {
        None => defaults.unwrap_or(Value::Null),
        Some(data @ Value::Object(_)) => {
            merge_objects(&defaults.unwrap_or_else(|| Value::Object(Map::new())), data, false)
        }
        Some(data) if is_falsy(data) => defaults.unwrap_or(Value::Null),
        Some(data) => data.clone(),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_defaults() {
        let schema = json!({"type": "object", "properties": {
            "address": {"type": "object", "default": {"city": "Oslo"}, "properties": {
                "city": {"type": "string"},
                "zip": {"type": "string", "default": "0150"}
            }}
        }});
        assert_eq!(
            default_form_state(&schema, None),
            json!({"address": {"city": "Oslo", "zip": "0150"}})
        );
    }

    #[test]
    fn test_fixed_items_get_one_default_each() {
        let schema = json!({"type": "object", "properties": {
            "list": {"type": "array", "items": [{"type": "object", "properties": {
                "n": {"type": "number", "default": 1}
            }}]}
        }});
        assert_eq!(default_form_state(&schema, None), json!({"list": [{"n": 1}]}));
        // provided arrays replace defaults
        assert_eq!(
            default_form_state(&schema, Some(&json!({"list": []}))),
            json!({"list": []})
        );
    }

    #[test]
    fn test_min_items_filler() {
        let schema = json!({"type": "array", "minItems": 3, "items": {"type": "string", "default": "x"}});
        assert_eq!(compute_defaults(&schema, Some(json!(["a"]))), Some(json!(["a", "x", "x"])));

        let multi = json!({"type": "array", "minItems": 2, "uniqueItems": true, "items": {"enum": ["a", "b"]}});
        assert_eq!(compute_defaults(&multi, None), Some(json!([])));
    }

    #[test]
    fn test_merge_replaces_arrays_without_concat() {
        let merged = merge_objects(&json!({"a": [1], "b": 5}), &json!({"a": [2], "b": {"c": 1}}), false);
        assert_eq!(merged, json!({"a": [2], "b": {"c": 1}}));
    }
}
