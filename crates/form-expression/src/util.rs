//! Coercion and comparison helpers following JavaScript semantics.

use crate::types::JsValue;
use serde_json::Value;

/// JavaScript truthiness.
///
/// ```
/// use form_expression::{util::is_truthy, JsValue};
/// use serde_json::json;
///
/// assert!(!is_truthy(&JsValue::Undefined));
/// assert!(!is_truthy(&JsValue::Json(json!(""))));
/// assert!(!is_truthy(&JsValue::Json(json!(0))));
/// assert!(is_truthy(&JsValue::Json(json!([]))));
/// ```
pub fn is_truthy(value: &JsValue) -> bool {
    match value {
        JsValue::Undefined => false,
        JsValue::Json(v) => match v {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        },
    }
}

/// Returns the `typeof` name of a value.
pub fn type_of(value: &JsValue) -> &'static str {
    match value {
        JsValue::Undefined => "undefined",
        JsValue::Json(v) => match v {
            Value::Null | Value::Array(_) | Value::Object(_) => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        },
    }
}

/// JavaScript `ToNumber`. Unlike the arithmetic operators this keeps `NaN`.
pub fn to_number(value: &JsValue) -> f64 {
    match value {
        JsValue::Undefined => f64::NAN,
        JsValue::Json(v) => match v {
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::String(s) => string_to_number(s),
            Value::Array(_) => string_to_number(&str_val(value)),
            Value::Object(_) => f64::NAN,
        },
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // Rust accepts "inf" and "nan", JavaScript does not.
        _ if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => f64::NAN,
        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    }
}

/// Formats a number the way JavaScript prints it: `3` rather than `3.0`.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// JavaScript `ToString`.
pub fn str_val(value: &JsValue) -> String {
    match value {
        JsValue::Undefined => "undefined".to_string(),
        JsValue::Json(v) => json_to_string(v),
    }
}

fn json_to_string(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if n.is_f64() {
                number_to_string(n.as_f64().unwrap_or(f64::NAN))
            } else {
                n.to_string()
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => json_to_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Converts a computed number into a value. Non-finite results become `null`,
/// integral results are stored as integers.
pub fn f64_to_jsval(n: f64) -> JsValue {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return JsValue::Json(Value::Number((n as i64).into()));
    }
    serde_json::Number::from_f64(n)
        .map(|num| JsValue::Json(Value::Number(num)))
        .unwrap_or(JsValue::Json(Value::Null))
}

/// `===`. Numbers compare by value, containers structurally.
pub fn strict_equals(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Undefined, JsValue::Undefined) => true,
        (JsValue::Json(Value::Number(x)), JsValue::Json(Value::Number(y))) => {
            x.as_f64() == y.as_f64()
        }
        (JsValue::Json(x), JsValue::Json(y)) => x == y,
        _ => false,
    }
}

/// `==`, with the abstract equality coercions for primitives.
pub fn loose_equals(a: &JsValue, b: &JsValue) -> bool {
    if a.is_nullish() || b.is_nullish() {
        return a.is_nullish() && b.is_nullish();
    }
    match (a, b) {
        (JsValue::Json(x), JsValue::Json(y)) => match (x, y) {
            (Value::String(_), Value::String(_))
            | (Value::Array(_) | Value::Object(_), Value::Array(_) | Value::Object(_)) => {
                strict_equals(a, b)
            }
            (Value::Array(_) | Value::Object(_), _) => {
                loose_equals(&JsValue::from(str_val(a)), b)
            }
            (_, Value::Array(_) | Value::Object(_)) => {
                loose_equals(a, &JsValue::from(str_val(b)))
            }
            _ => to_number(a) == to_number(b),
        },
        _ => false,
    }
}

fn both_strings<'a>(a: &'a JsValue, b: &'a JsValue) -> Option<(&'a str, &'a str)> {
    match (a, b) {
        (JsValue::Json(Value::String(x)), JsValue::Json(Value::String(y))) => Some((x, y)),
        _ => None,
    }
}

pub fn js_lt(a: &JsValue, b: &JsValue) -> bool {
    match both_strings(a, b) {
        Some((x, y)) => x < y,
        None => to_number(a) < to_number(b),
    }
}

pub fn js_lte(a: &JsValue, b: &JsValue) -> bool {
    match both_strings(a, b) {
        Some((x, y)) => x <= y,
        None => to_number(a) <= to_number(b),
    }
}

pub fn js_gt(a: &JsValue, b: &JsValue) -> bool {
    match both_strings(a, b) {
        Some((x, y)) => x > y,
        None => to_number(a) > to_number(b),
    }
}

pub fn js_gte(a: &JsValue, b: &JsValue) -> bool {
    match both_strings(a, b) {
        Some((x, y)) => x >= y,
        None => to_number(a) >= to_number(b),
    }
}

/// Reads a property the way member access does on a non-nullish receiver.
pub fn property_of(receiver: &JsValue, key: &str) -> JsValue {
    let JsValue::Json(value) = receiver else {
        return JsValue::Undefined;
    };
    match value {
        Value::Object(map) => map.get(key).cloned().into(),
        Value::Array(items) => {
            if key == "length" {
                return JsValue::from(items.len() as i64);
            }
            match key.parse::<usize>() {
                Ok(i) if i.to_string() == key => items.get(i).cloned().into(),
                _ => JsValue::Undefined,
            }
        }
        Value::String(s) => {
            if key == "length" {
                return JsValue::from(s.encode_utf16().count() as i64);
            }
            match key.parse::<usize>() {
                Ok(i) if i.to_string() == key => s
                    .chars()
                    .nth(i)
                    .map(|c| JsValue::from(c.to_string()))
                    .unwrap_or(JsValue::Undefined),
                _ => JsValue::Undefined,
            }
        }
        _ => JsValue::Undefined,
    }
}

/// Property key produced by a computed index such as `row.list[i]`.
pub fn property_key(value: &JsValue) -> String {
    str_val(value)
}
