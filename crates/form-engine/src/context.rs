//! Per-change working state.

use crate::config::EngineOptions;
use crate::error::EngineError;
use form_expression::JsValue;
use form_path::{FieldPath, PathError};
use serde_json::Value;
use tracing::trace;

/// One change applied to a [`TrackedSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaMutation {
    Inserted(FieldPath),
    Removed(FieldPath),
    Required { list: FieldPath, field: String },
    Unrequired { list: FieldPath, field: String },
}

/// A working copy of the live schema, owned by a single change pass.
///
/// Mutations are recorded in order; the log is informational and is not
/// needed to commit.
#[derive(Debug, Clone)]
pub struct TrackedSchema {
    value: Value,
    log: Vec<SchemaMutation>,
}

impl TrackedSchema {
    pub fn new(value: Value) -> Self {
        TrackedSchema {
            value,
            log: Vec::new(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn mutations(&self) -> &[SchemaMutation] {
        &self.log
    }

    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        path.get(&self.value)
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        path.contains(&self.value)
    }

    pub fn insert(&mut self, path: &FieldPath, fragment: Value) -> Result<(), PathError> {
        path.set(&mut self.value, fragment)?;
        trace!(path = %path, "schema entry inserted");
        self.log.push(SchemaMutation::Inserted(path.clone()));
        Ok(())
    }

    pub fn remove(&mut self, path: &FieldPath) -> Result<Option<Value>, PathError> {
        let removed = path.remove(&mut self.value)?;
        if removed.is_some() {
            trace!(path = %path, "schema entry removed");
            self.log.push(SchemaMutation::Removed(path.clone()));
        }
        Ok(removed)
    }

    /// Makes sure an array lives at `list`. Anything else there is replaced.
    pub fn ensure_list(&mut self, list: &FieldPath) -> Result<(), PathError> {
        if !matches!(list.get(&self.value), Some(Value::Array(_))) {
            list.set(&mut self.value, Value::Array(Vec::new()))?;
        }
        Ok(())
    }

    /// Adds `field` to the `required` list at `list`, once.
    ///
    /// Returns whether the list changed.
    pub fn add_required(&mut self, list: &FieldPath, field: &str) -> Result<bool, PathError> {
        self.ensure_list(list)?;
        let Some(Value::Array(names)) = list.get_mut(&mut self.value) else {
            return Ok(false);
        };
        if names.iter().any(|name| name.as_str() == Some(field)) {
            return Ok(false);
        }
        names.push(Value::String(field.to_string()));
        trace!(list = %list, field, "field required");
        self.log.push(SchemaMutation::Required {
            list: list.clone(),
            field: field.to_string(),
        });
        Ok(true)
    }

    /// Removes every occurrence of `field` from the list at `list`.
    ///
    /// A missing list is left missing. Returns whether the list changed.
    pub fn remove_required(&mut self, list: &FieldPath, field: &str) -> Result<bool, PathError> {
        if !list.is_resolved() {
            return Err(PathError::UnresolvedPlaceholder(list.to_dotted()));
        }
        let Some(Value::Array(names)) = list.get_mut(&mut self.value) else {
            return Ok(false);
        };
        let before = names.len();
        names.retain(|name| name.as_str() != Some(field));
        if names.len() == before {
            return Ok(false);
        }
        trace!(list = %list, field, "field no longer required");
        self.log.push(SchemaMutation::Unrequired {
            list: list.clone(),
            field: field.to_string(),
        });
        Ok(true)
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

/// Everything a change pass needs to know about one edit.
#[derive(Debug, Clone)]
pub struct ChangeContext {
    pub field_key: String,
    pub value: Value,
    /// Canonical data path of the edited field.
    pub data_path: FieldPath,
    /// Data path of the object holding the edited field.
    pub parent_context: FieldPath,
    /// Array indices of `parent_context`, left to right.
    pub indices: Vec<usize>,
    /// Form data with the edit applied.
    pub row: Value,
    pub schema: TrackedSchema,
    /// The edit addressed the whole form; passes stop here.
    pub root_write: bool,
}

impl ChangeContext {
    /// The `data` binding for a field living under `field_context`.
    ///
    /// Only fields in the same object as the edited field see it; every
    /// other field sees `undefined`.
    pub fn data_for(&self, field_context: &FieldPath) -> JsValue {
        if *field_context != self.parent_context {
            return JsValue::Undefined;
        }
        field_context.get(&self.row).cloned().into()
    }
}

/// Builds the context for setting `field_key` to `value`.
///
/// ```
/// use form_engine::{build_context, EngineOptions};
/// use serde_json::json;
///
/// let ctx = build_context(
///     "root_list_1_name",
///     json!("b"),
///     &json!({"list": [{"name": "a"}]}),
///     &json!({}),
///     &EngineOptions::default(),
/// ).unwrap();
/// assert_eq!(ctx.data_path.to_dotted(), "list.1.name");
/// assert_eq!(ctx.parent_context.to_dotted(), "list.1");
/// assert_eq!(ctx.indices, vec![1]);
/// assert_eq!(ctx.row, json!({"list": [{"name": "a"}, {"name": "b"}]}));
/// ```
pub fn build_context(
    field_key: &str,
    value: Value,
    form_data: &Value,
    schema: &Value,
    options: &EngineOptions,
) -> Result<ChangeContext, EngineError> {
    let data_path = FieldPath::from_field_key(field_key, &options.root_marker);
    let parent_context = data_path.parent_context();
    let indices = parent_context.indices();
    let root_write = data_path.is_root();
    let mut row = form_data.clone();
    if !root_write {
        data_path.set(&mut row, value.clone())?;
    }
    Ok(ChangeContext {
        field_key: field_key.to_string(),
        value,
        data_path,
        parent_context,
        indices,
        row,
        schema: TrackedSchema::new(schema.clone()),
        root_write,
    })
}
