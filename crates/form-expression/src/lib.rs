//! A restricted, JavaScript-like expression language for form conditions.
//!
//! Conditions such as `data.kind === 'b' && row.items.length > 0` are parsed
//! into a syntax tree and evaluated against [`Bindings`]. There are no
//! assignments, loops or user functions; calls are limited to a fixed set of
//! string/array methods and global functions.
//!
//! # Example
//!
//! ```
//! use form_expression::{Bindings, CompiledExpression, JsValue, ParseOptions};
//! use serde_json::json;
//!
//! let expr = CompiledExpression::compile(
//!     "data.kind === 'b' && row.email.endsWith('@example.com')",
//!     &ParseOptions::default(),
//! );
//! assert!(expr.references("data"));
//! assert_eq!(expr.dependencies(), vec!["data.kind", "row.email"]);
//!
//! let bindings = Bindings::form(
//!     json!({"kind": "b"}).into(),
//!     json!({"email": "a@example.com"}).into(),
//!     JsValue::Undefined,
//! );
//! assert_eq!(expr.test(&bindings), Ok(true));
//! ```

pub mod ast;
pub mod bindings;
pub mod builtins;
pub mod compile;
pub mod error;
pub mod evaluate;
pub mod parser;
pub mod types;
pub mod util;

pub use ast::Expr;
pub use bindings::Bindings;
pub use compile::CompiledExpression;
pub use error::ExpressionError;
pub use evaluate::evaluate;
pub use parser::{ExpressionParser, ParseOptions};
pub use types::{Arity, JsValue};
