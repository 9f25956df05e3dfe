//! Global functions.

use crate::error::ExpressionError;
use crate::types::{Arity, FunctionDefinition, JsValue};
use crate::util;
use regex::Regex;

fn arg(args: &[JsValue], i: usize) -> JsValue {
    args.get(i).cloned().unwrap_or(JsValue::Undefined)
}

fn number_eval(args: &[JsValue]) -> Result<JsValue, ExpressionError> {
    if args.is_empty() {
        return Ok(JsValue::from(0i64));
    }
    Ok(util::f64_to_jsval(util::to_number(&args[0])))
}

fn string_eval(args: &[JsValue]) -> Result<JsValue, ExpressionError> {
    if args.is_empty() {
        return Ok(JsValue::from(""));
    }
    Ok(JsValue::from(util::str_val(&args[0])))
}

fn boolean_eval(args: &[JsValue]) -> Result<JsValue, ExpressionError> {
    Ok(JsValue::from(util::is_truthy(&arg(args, 0))))
}

fn is_nan_eval(args: &[JsValue]) -> Result<JsValue, ExpressionError> {
    Ok(JsValue::from(util::to_number(&arg(args, 0)).is_nan()))
}

/// `matches(value, pattern)` tests the string form of `value` against a
/// regular expression.
fn matches_eval(args: &[JsValue]) -> Result<JsValue, ExpressionError> {
    let pattern = util::str_val(&arg(args, 1));
    let regex = Regex::new(&pattern).map_err(|e| ExpressionError::InvalidRegex(e.to_string()))?;
    let subject = arg(args, 0);
    if subject.is_nullish() {
        return Ok(JsValue::from(false));
    }
    Ok(JsValue::from(regex.is_match(&util::str_val(&subject))))
}

pub static FUNCTIONS: &[FunctionDefinition] = &[
    FunctionDefinition {
        name: "Number",
        aliases: &[],
        arity: Arity::Range(0, 1),
        eval_fn: number_eval,
    },
    FunctionDefinition {
        name: "String",
        aliases: &[],
        arity: Arity::Range(0, 1),
        eval_fn: string_eval,
    },
    FunctionDefinition {
        name: "Boolean",
        aliases: &[],
        arity: Arity::Range(0, 1),
        eval_fn: boolean_eval,
    },
    FunctionDefinition {
        name: "isNaN",
        aliases: &[],
        arity: Arity::Fixed(1),
        eval_fn: is_nan_eval,
    },
    FunctionDefinition {
        name: "matches",
        aliases: &["test"],
        arity: Arity::Fixed(2),
        eval_fn: matches_eval,
    },
];
