use crate::error::ExpressionError;
use serde_json::Value;

/// A runtime value: any JSON value, or JavaScript `undefined`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JsValue {
    #[default]
    Undefined,
    Json(Value),
}

impl JsValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    /// `undefined` or `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, JsValue::Undefined | JsValue::Json(Value::Null))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            JsValue::Json(v) => Some(v),
            JsValue::Undefined => None,
        }
    }

    /// Lossy conversion used when a value is stored inside JSON (array
    /// literals, `this`): `undefined` becomes `null`.
    pub fn into_json(self) -> Value {
        match self {
            JsValue::Json(v) => v,
            JsValue::Undefined => Value::Null,
        }
    }
}

impl From<Value> for JsValue {
    fn from(v: Value) -> Self {
        JsValue::Json(v)
    }
}

impl From<Option<Value>> for JsValue {
    fn from(v: Option<Value>) -> Self {
        v.map(JsValue::Json).unwrap_or(JsValue::Undefined)
    }
}

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Json(Value::Bool(b))
    }
}

impl From<f64> for JsValue {
    fn from(n: f64) -> Self {
        crate::util::f64_to_jsval(n)
    }
}

impl From<i64> for JsValue {
    fn from(n: i64) -> Self {
        JsValue::Json(Value::Number(n.into()))
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::Json(Value::String(s))
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::Json(Value::String(s.to_string()))
    }
}

/// Number of arguments a builtin accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arity {
    Fixed(usize),
    /// Between `min` and `max` arguments, inclusive.
    Range(usize, usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Fixed(n) => count == n,
            Arity::Range(min, max) => (min..=max).contains(&count),
        }
    }
}

pub type MethodFn = fn(&JsValue, &[JsValue]) -> Result<JsValue, ExpressionError>;
pub type FunctionFn = fn(&[JsValue]) -> Result<JsValue, ExpressionError>;

/// A method callable on a receiver, e.g. `row.name.startsWith("a")`.
pub struct MethodDefinition {
    pub name: &'static str,
    pub arity: Arity,
    pub eval_fn: MethodFn,
}

/// A free function, e.g. `Number(row.age)`.
pub struct FunctionDefinition {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub arity: Arity,
    pub eval_fn: FunctionFn,
}
