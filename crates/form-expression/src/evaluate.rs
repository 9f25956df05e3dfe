//! Tree-walking evaluator.

use crate::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
use crate::bindings::Bindings;
use crate::builtins::{find_function, find_method};
use crate::error::ExpressionError;
use crate::types::JsValue;
use crate::util;
use serde_json::Value;

/// Evaluates `expr` against `bindings`.
///
/// # Example
///
/// ```
/// use form_expression::{evaluate, Bindings, ExpressionParser, JsValue};
/// use serde_json::json;
///
/// let expr = ExpressionParser::parse("data.kind === 'b' ? 1 : 2").unwrap();
/// let bindings = Bindings::form(json!({"kind": "b"}).into(), JsValue::Undefined, JsValue::Undefined);
/// assert_eq!(evaluate(&expr, &bindings).unwrap(), JsValue::Json(json!(1)));
/// ```
pub fn evaluate(expr: &Expr, bindings: &Bindings) -> Result<JsValue, ExpressionError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(evaluate(item, bindings)?.into_json());
            }
            Ok(JsValue::Json(Value::Array(out)))
        }
        Expr::Ident(name) => bindings
            .get(name)
            .cloned()
            .ok_or_else(|| ExpressionError::Reference(name.clone())),
        Expr::This => Ok(bindings.this_object()),
        Expr::Member {
            object,
            property,
            optional,
        } => {
            let receiver = evaluate(object, bindings)?;
            if *optional && receiver.is_nullish() {
                return Ok(JsValue::Undefined);
            }
            read_property(&receiver, property)
        }
        Expr::Index { object, index } => {
            let receiver = evaluate(object, bindings)?;
            let key = evaluate(index, bindings)?;
            read_property(&receiver, &util::property_key(&key))
        }
        Expr::Call { callee, args } => eval_call(callee, args, bindings),
        Expr::Unary { op, operand } => eval_unary(*op, operand, bindings),
        Expr::Binary { op, left, right } => {
            let left = evaluate(left, bindings)?;
            let right = evaluate(right, bindings)?;
            Ok(eval_binary(*op, &left, &right))
        }
        Expr::Logical { op, left, right } => {
            let left = evaluate(left, bindings)?;
            let short_circuit = match op {
                LogicalOp::And => !util::is_truthy(&left),
                LogicalOp::Or => util::is_truthy(&left),
            };
            if short_circuit {
                Ok(left)
            } else {
                evaluate(right, bindings)
            }
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            if util::is_truthy(&evaluate(test, bindings)?) {
                evaluate(consequent, bindings)
            } else {
                evaluate(alternate, bindings)
            }
        }
    }
}

fn read_property(receiver: &JsValue, property: &str) -> Result<JsValue, ExpressionError> {
    if receiver.is_nullish() {
        return Err(ExpressionError::Type(format!(
            "Cannot read properties of {} (reading '{property}')",
            util::str_val(receiver)
        )));
    }
    Ok(util::property_of(receiver, property))
}

fn eval_args(args: &[Expr], bindings: &Bindings) -> Result<Vec<JsValue>, ExpressionError> {
    args.iter().map(|arg| evaluate(arg, bindings)).collect()
}

fn eval_call(callee: &Expr, args: &[Expr], bindings: &Bindings) -> Result<JsValue, ExpressionError> {
    match callee {
        Expr::Member {
            object,
            property,
            optional,
        } => {
            let receiver = evaluate(object, bindings)?;
            if *optional && receiver.is_nullish() {
                return Ok(JsValue::Undefined);
            }
            if receiver.is_nullish() {
                return Err(ExpressionError::Type(format!(
                    "Cannot read properties of {} (reading '{property}')",
                    util::str_val(&receiver)
                )));
            }
            let method =
                find_method(property).ok_or_else(|| ExpressionError::UnknownMethod(property.clone()))?;
            let args = eval_args(args, bindings)?;
            if !method.arity.accepts(args.len()) {
                return Err(ExpressionError::Arity(format!(
                    "\"{}\" takes {:?} arguments, got {}",
                    method.name,
                    method.arity,
                    args.len()
                )));
            }
            (method.eval_fn)(&receiver, &args)
        }
        Expr::Ident(name) if !bindings.has(name) => {
            let function =
                find_function(name).ok_or_else(|| ExpressionError::UnknownFunction(name.clone()))?;
            let args = eval_args(args, bindings)?;
            if !function.arity.accepts(args.len()) {
                return Err(ExpressionError::Arity(format!(
                    "\"{}\" takes {:?} arguments, got {}",
                    function.name,
                    function.arity,
                    args.len()
                )));
            }
            (function.eval_fn)(&args)
        }
        other => {
            let value = evaluate(other, bindings)?;
            Err(ExpressionError::Type(format!(
                "{} is not a function",
                util::type_of(&value)
            )))
        }
    }
}

fn eval_unary(op: UnaryOp, operand: &Expr, bindings: &Bindings) -> Result<JsValue, ExpressionError> {
    // `typeof missing` is "undefined" rather than a ReferenceError.
    if op == UnaryOp::TypeOf {
        if let Expr::Ident(name) = operand {
            if !bindings.has(name) {
                return Ok(JsValue::from("undefined"));
            }
        }
    }
    let value = evaluate(operand, bindings)?;
    Ok(match op {
        UnaryOp::Not => JsValue::from(!util::is_truthy(&value)),
        UnaryOp::Neg => util::f64_to_jsval(-util::to_number(&value)),
        UnaryOp::Plus => util::f64_to_jsval(util::to_number(&value)),
        UnaryOp::TypeOf => JsValue::from(util::type_of(&value)),
    })
}

fn eval_binary(op: BinaryOp, left: &JsValue, right: &JsValue) -> JsValue {
    match op {
        BinaryOp::StrictEq => JsValue::from(util::strict_equals(left, right)),
        BinaryOp::StrictNe => JsValue::from(!util::strict_equals(left, right)),
        BinaryOp::LooseEq => JsValue::from(util::loose_equals(left, right)),
        BinaryOp::LooseNe => JsValue::from(!util::loose_equals(left, right)),
        BinaryOp::Lt => JsValue::from(util::js_lt(left, right)),
        BinaryOp::Le => JsValue::from(util::js_lte(left, right)),
        BinaryOp::Gt => JsValue::from(util::js_gt(left, right)),
        BinaryOp::Ge => JsValue::from(util::js_gte(left, right)),
        BinaryOp::Add => {
            if is_string_like(left) || is_string_like(right) {
                let mut s = util::str_val(left);
                s.push_str(&util::str_val(right));
                JsValue::from(s)
            } else {
                util::f64_to_jsval(util::to_number(left) + util::to_number(right))
            }
        }
        BinaryOp::Sub => util::f64_to_jsval(util::to_number(left) - util::to_number(right)),
        BinaryOp::Mul => util::f64_to_jsval(util::to_number(left) * util::to_number(right)),
        BinaryOp::Div => util::f64_to_jsval(util::to_number(left) / util::to_number(right)),
        BinaryOp::Rem => util::f64_to_jsval(util::to_number(left) % util::to_number(right)),
    }
}

/// Operands that make `+` concatenate.
fn is_string_like(value: &JsValue) -> bool {
    matches!(
        value,
        JsValue::Json(Value::String(_) | Value::Array(_) | Value::Object(_))
    )
}
