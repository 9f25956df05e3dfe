//! Expression syntax tree.

use crate::types::JsValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    TypeOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    StrictEq,
    StrictNe,
    LooseEq,
    LooseNe,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(JsValue),
    Array(Vec<Expr>),
    Ident(String),
    This,
    Member {
        object: Box<Expr>,
        property: String,
        optional: bool,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
}

impl Expr {
    /// Calls `f` on this node and every descendant, parents first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        f(self);
        match self {
            Expr::Literal(_) | Expr::Ident(_) | Expr::This => {}
            Expr::Array(items) => {
                for item in items {
                    item.walk(f);
                }
            }
            Expr::Member { object, .. } => object.walk(f),
            Expr::Index { object, index } => {
                object.walk(f);
                index.walk(f);
            }
            Expr::Call { callee, args } => {
                callee.walk(f);
                for arg in args {
                    arg.walk(f);
                }
            }
            Expr::Unary { operand, .. } => operand.walk(f),
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                left.walk(f);
                right.walk(f);
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                test.walk(f);
                consequent.walk(f);
                alternate.walk(f);
            }
        }
    }

    /// True when the binding `name` is read, either directly or as `this.<name>`.
    pub fn references(&self, name: &str) -> bool {
        let mut found = false;
        self.walk(&mut |node| match node {
            Expr::Ident(ident) if ident == name => found = true,
            Expr::Member {
                object, property, ..
            } if **object == Expr::This && property == name => found = true,
            _ => {}
        });
        found
    }

    /// Static member chain rooted at a binding, e.g. `row.address.city`.
    ///
    /// `this.row.x` is normalised to `row.x`.
    pub fn member_chain(&self) -> Option<Vec<String>> {
        match self {
            Expr::Ident(name) => Some(vec![name.clone()]),
            Expr::Member {
                object, property, ..
            } => {
                if **object == Expr::This {
                    return Some(vec![property.clone()]);
                }
                let mut chain = object.member_chain()?;
                chain.push(property.clone());
                Some(chain)
            }
            Expr::Index { object, index } => match index.as_ref() {
                Expr::Literal(JsValue::Json(key)) if key.is_string() || key.is_number() => {
                    let mut chain = object.member_chain()?;
                    chain.push(match key.as_str() {
                        Some(s) => s.to_string(),
                        None => key.to_string(),
                    });
                    Some(chain)
                }
                _ => None,
            },
            _ => None,
        }
    }
}
