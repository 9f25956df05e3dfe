//! Methods on strings and arrays.

use crate::error::ExpressionError;
use crate::types::{Arity, JsValue, MethodDefinition};
use crate::util;
use serde_json::Value;

fn receiver_str<'a>(receiver: &'a JsValue, method: &str) -> Result<&'a str, ExpressionError> {
    match receiver {
        JsValue::Json(Value::String(s)) => Ok(s),
        other => Err(ExpressionError::Type(format!(
            "{}.{method} is not a function",
            util::type_of(other)
        ))),
    }
}

fn arg(args: &[JsValue], i: usize) -> JsValue {
    args.get(i).cloned().unwrap_or(JsValue::Undefined)
}

fn includes_eval(receiver: &JsValue, args: &[JsValue]) -> Result<JsValue, ExpressionError> {
    let needle = arg(args, 0);
    match receiver {
        JsValue::Json(Value::Array(items)) => Ok(JsValue::from(
            items
                .iter()
                .any(|item| util::strict_equals(&JsValue::Json(item.clone()), &needle)),
        )),
        _ => {
            let s = receiver_str(receiver, "includes")?;
            Ok(JsValue::from(s.contains(util::str_val(&needle).as_str())))
        }
    }
}

fn index_of_eval(receiver: &JsValue, args: &[JsValue]) -> Result<JsValue, ExpressionError> {
    let needle = arg(args, 0);
    let position = match receiver {
        JsValue::Json(Value::Array(items)) => items
            .iter()
            .position(|item| util::strict_equals(&JsValue::Json(item.clone()), &needle)),
        _ => {
            let s = receiver_str(receiver, "indexOf")?;
            s.find(util::str_val(&needle).as_str())
                .map(|byte_pos| s[..byte_pos].chars().count())
        }
    };
    Ok(JsValue::from(position.map(|p| p as i64).unwrap_or(-1)))
}

fn starts_with_eval(receiver: &JsValue, args: &[JsValue]) -> Result<JsValue, ExpressionError> {
    let s = receiver_str(receiver, "startsWith")?;
    Ok(JsValue::from(s.starts_with(util::str_val(&arg(args, 0)).as_str())))
}

fn ends_with_eval(receiver: &JsValue, args: &[JsValue]) -> Result<JsValue, ExpressionError> {
    let s = receiver_str(receiver, "endsWith")?;
    Ok(JsValue::from(s.ends_with(util::str_val(&arg(args, 0)).as_str())))
}

fn trim_eval(receiver: &JsValue, _args: &[JsValue]) -> Result<JsValue, ExpressionError> {
    Ok(JsValue::from(receiver_str(receiver, "trim")?.trim()))
}

fn to_lower_case_eval(receiver: &JsValue, _args: &[JsValue]) -> Result<JsValue, ExpressionError> {
    Ok(JsValue::from(receiver_str(receiver, "toLowerCase")?.to_lowercase()))
}

fn to_upper_case_eval(receiver: &JsValue, _args: &[JsValue]) -> Result<JsValue, ExpressionError> {
    Ok(JsValue::from(receiver_str(receiver, "toUpperCase")?.to_uppercase()))
}

fn to_string_eval(receiver: &JsValue, _args: &[JsValue]) -> Result<JsValue, ExpressionError> {
    Ok(JsValue::from(util::str_val(receiver)))
}

pub static METHODS: &[MethodDefinition] = &[
    MethodDefinition {
        name: "includes",
        arity: Arity::Fixed(1),
        eval_fn: includes_eval,
    },
    MethodDefinition {
        name: "indexOf",
        arity: Arity::Fixed(1),
        eval_fn: index_of_eval,
    },
    MethodDefinition {
        name: "startsWith",
        arity: Arity::Fixed(1),
        eval_fn: starts_with_eval,
    },
    MethodDefinition {
        name: "endsWith",
        arity: Arity::Fixed(1),
        eval_fn: ends_with_eval,
    },
    MethodDefinition {
        name: "trim",
        arity: Arity::Fixed(0),
        eval_fn: trim_eval,
    },
    MethodDefinition {
        name: "toLowerCase",
        arity: Arity::Fixed(0),
        eval_fn: to_lower_case_eval,
    },
    MethodDefinition {
        name: "toUpperCase",
        arity: Arity::Fixed(0),
        eval_fn: to_upper_case_eval,
    },
    MethodDefinition {
        name: "toString",
        arity: Arity::Fixed(0),
        eval_fn: to_string_eval,
    },
];
