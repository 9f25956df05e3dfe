use crate::types::JsValue;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Names visible to an expression.
///
/// A form condition sees `data` (the nearest enclosing object of the changed
/// field), `row` (the whole form data) and `action`, both as bare names and
/// as properties of `this`.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    vars: HashMap<String, JsValue>,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings::default()
    }

    /// Bindings for a form condition.
    pub fn form(data: JsValue, row: JsValue, action: JsValue) -> Self {
        let mut bindings = Bindings::new();
        bindings.set("data", data);
        bindings.set("row", row);
        bindings.set("action", action);
        bindings
    }

    pub fn get(&self, name: &str) -> Option<&JsValue> {
        self.vars.get(name)
    }

    pub fn set(&mut self, name: &str, value: JsValue) {
        self.vars.insert(name.to_string(), value);
    }

    pub fn has(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// The object `this` evaluates to. Undefined bindings are left out.
    pub fn this_object(&self) -> JsValue {
        let mut names: Vec<&String> = self.vars.keys().collect();
        names.sort();
        let mut map = Map::new();
        for name in names {
            if let Some(JsValue::Json(value)) = self.vars.get(name) {
                map.insert(name.clone(), value.clone());
            }
        }
        JsValue::Json(Value::Object(map))
    }
}
