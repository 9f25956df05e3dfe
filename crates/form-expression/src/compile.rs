//! Compile-once expressions.
//!
//! A form condition is parsed when the field definitions are adapted and
//! evaluated on every edit. A source that fails to parse is kept along with
//! its error so that every evaluation reports it.

use crate::ast::Expr;
use crate::bindings::Bindings;
use crate::error::ExpressionError;
use crate::evaluate::evaluate;
use crate::parser::{ExpressionParser, ParseOptions};
use crate::types::JsValue;
use crate::util;

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    source: String,
    parsed: Result<Expr, ExpressionError>,
}

impl CompiledExpression {
    pub fn compile(source: &str, options: &ParseOptions) -> Self {
        CompiledExpression {
            source: source.to_string(),
            parsed: ExpressionParser::parse_with_options(source, options),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_valid(&self) -> bool {
        self.parsed.is_ok()
    }

    pub fn parse_error(&self) -> Option<&ExpressionError> {
        self.parsed.as_ref().err()
    }

    pub fn ast(&self) -> Option<&Expr> {
        self.parsed.as_ref().ok()
    }

    pub fn evaluate(&self, bindings: &Bindings) -> Result<JsValue, ExpressionError> {
        match &self.parsed {
            Ok(expr) => evaluate(expr, bindings),
            Err(err) => Err(err.clone()),
        }
    }

    /// Evaluates and applies truthiness.
    ///
    /// ```
    /// use form_expression::{Bindings, CompiledExpression, JsValue, ParseOptions};
    /// use serde_json::json;
    ///
    /// let show = CompiledExpression::compile("row.age >= 18", &ParseOptions::default());
    /// let bindings = Bindings::form(JsValue::Undefined, json!({"age": 21}).into(), JsValue::Undefined);
    /// assert_eq!(show.test(&bindings), Ok(true));
    /// ```
    pub fn test(&self, bindings: &Bindings) -> Result<bool, ExpressionError> {
        self.evaluate(bindings).map(|value| util::is_truthy(&value))
    }

    /// True when the expression reads the binding `name`.
    ///
    /// For a source that did not parse this falls back to a substring check,
    /// so callers gating on a binding stay conservative.
    pub fn references(&self, name: &str) -> bool {
        match &self.parsed {
            Ok(expr) => expr.references(name),
            Err(_) => self.source.contains(name),
        }
    }

    /// Static member chains the expression reads, as dotted strings such as
    /// `row.address.city`, in first-seen order. Method names are not part
    /// of a chain.
    pub fn dependencies(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(expr) = self.ast() {
            collect_chains(expr, &mut out);
        }
        out
    }
}

fn collect_chains(expr: &Expr, out: &mut Vec<String>) {
    if let Some(chain) = expr.member_chain() {
        let dotted = chain.join(".");
        if !out.contains(&dotted) {
            out.push(dotted);
        }
        return;
    }
    match expr {
        Expr::Literal(_) | Expr::Ident(_) | Expr::This => {}
        Expr::Array(items) => {
            for item in items {
                collect_chains(item, out);
            }
        }
        Expr::Call { callee, args } => {
            match callee.as_ref() {
                Expr::Member { object, .. } => collect_chains(object, out),
                Expr::Ident(_) => {}
                other => collect_chains(other, out),
            }
            for arg in args {
                collect_chains(arg, out);
            }
        }
        Expr::Member { object, .. } => collect_chains(object, out),
        Expr::Index { object, index } => {
            collect_chains(object, out);
            collect_chains(index, out);
        }
        Expr::Unary { operand, .. } => collect_chains(operand, out),
        Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
            collect_chains(left, out);
            collect_chains(right, out);
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            collect_chains(test, out);
            collect_chains(consequent, out);
            collect_chains(alternate, out);
        }
    }
}
