//! The `action` binding seen by show and required expressions.
//!
//! Hosts publish the current action (for example `{"name": "create"}`) to a
//! process-wide store; forms read it at the start of every change pass.

use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::RwLock;

static GLOBAL_ACTION: Lazy<RwLock<Value>> = Lazy::new(|| RwLock::new(Value::Null));

/// Publishes the current action.
pub fn set_global_action(action: Value) {
    let mut slot = GLOBAL_ACTION.write().unwrap_or_else(|e| e.into_inner());
    *slot = action;
}

/// Current action, `null` until one is published.
pub fn global_action() -> Value {
    GLOBAL_ACTION
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// Supplies the `action` binding for a change pass.
pub trait ActionSource {
    fn current(&self) -> Value;
}

/// Reads the process-wide store.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalAction;

impl ActionSource for GlobalAction {
    fn current(&self) -> Value {
        global_action()
    }
}

/// A fixed action, independent of the process-wide store.
#[derive(Debug, Clone, Default)]
pub struct StaticAction(pub Value);

impl ActionSource for StaticAction {
    fn current(&self) -> Value {
        self.0.clone()
    }
}
