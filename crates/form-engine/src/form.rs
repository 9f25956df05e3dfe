//! Form state: the authoritative schema and data of one rendered form.

use crate::action::{ActionSource, GlobalAction};
use crate::adapter::{
    AdaptedSchema, ConditionalFieldRegistry, ConditionalRequiredRegistry, ADDITIONAL_ITEMS, ITEMS,
    PROPERTIES,
};
use crate::config::EngineOptions;
use crate::context::{build_context, SchemaMutation};
use crate::defaults::default_form_state;
use crate::error::EngineError;
use crate::ids::to_id_schema;
use crate::required::{evaluate_required, RequiredOutcome};
use crate::show::{evaluate_show, ShowOutcome};
use crate::validate::{to_error_schema, FieldError, JsonSchemaValidator, Validate};
use form_path::{FieldPath, PathError, Segment};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// What one change pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    pub field_key: String,
    /// The edit addressed the form root; nothing was evaluated or committed.
    pub root_write: bool,
    pub show: Vec<(String, ShowOutcome)>,
    pub required: Vec<(String, RequiredOutcome)>,
    pub mutations: Vec<SchemaMutation>,
}

impl PassReport {
    pub fn show_outcome(&self, key: &str) -> Option<ShowOutcome> {
        self.show.iter().find(|(k, _)| k == key).map(|(_, o)| *o)
    }

    pub fn required_outcome(&self, key: &str) -> Option<RequiredOutcome> {
        self.required.iter().find(|(k, _)| k == key).map(|(_, o)| *o)
    }
}

/// Everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSnapshot {
    pub schema: Value,
    pub ui_schema: Value,
    pub id_schema: Value,
    pub form_data: Value,
    pub error_schema: Value,
}

pub struct FormState {
    options: EngineOptions,
    schema: Value,
    ui_schema: Value,
    id_schema: Value,
    form_data: Value,
    errors: Vec<FieldError>,
    error_schema: Value,
    conditional_fields: Arc<ConditionalFieldRegistry>,
    conditional_required: Arc<ConditionalRequiredRegistry>,
    validator: Box<dyn Validate>,
    action: Box<dyn ActionSource>,
}

impl FormState {
    /// Builds the state for an adapted document and optional initial data.
    ///
    /// Initial data is merged over the schema defaults. Conditional fields
    /// are not evaluated until [`FormState::replay_form_data`] or the first
    /// change.
    pub fn new(
        adapted: AdaptedSchema,
        initial: Option<Value>,
        options: EngineOptions,
    ) -> Result<Self, EngineError> {
        options.check()?;
        let AdaptedSchema {
            schema,
            ui_schema,
            form_data,
            conditional_fields,
            conditional_required,
            ..
        } = adapted;
        let data = initial.unwrap_or(form_data);
        let mut state = FormState {
            id_schema: Value::Null,
            form_data: Value::Null,
            errors: Vec::new(),
            error_schema: Value::Object(Map::new()),
            schema,
            ui_schema,
            conditional_fields,
            conditional_required,
            validator: Box::new(JsonSchemaValidator),
            action: Box::new(GlobalAction),
            options,
        };
        state.load(&data)?;
        Ok(state)
    }

    pub fn with_validator(mut self, validator: impl Validate + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn with_action_source(mut self, action: impl ActionSource + 'static) -> Self {
        self.action = Box::new(action);
        self
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn ui_schema(&self) -> &Value {
        &self.ui_schema
    }

    pub fn id_schema(&self) -> &Value {
        &self.id_schema
    }

    pub fn form_data(&self) -> &Value {
        &self.form_data
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_schema(&self) -> &Value {
        &self.error_schema
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn conditional_fields(&self) -> &ConditionalFieldRegistry {
        &self.conditional_fields
    }

    pub fn conditional_required(&self) -> &ConditionalRequiredRegistry {
        &self.conditional_required
    }

    /// True when the field at `schema_path` (dotted, below the root
    /// `properties`) is part of the live schema.
    pub fn is_shown(&self, schema_path: &str) -> bool {
        FieldPath::root()
            .child(PROPERTIES)
            .join(&FieldPath::from_dotted(schema_path))
            .contains(&self.schema)
    }

    fn load(&mut self, data: &Value) -> Result<(), EngineError> {
        let form_data = default_form_state(&self.schema, Some(data));
        let mut schema = self.schema.clone();
        sync_array_items(&mut schema, &form_data);
        self.commit(schema, form_data)
    }

    /// Installs a schema and its data together. With live validation the
    /// pair is validated first, and a validator error leaves the form as
    /// it was.
    fn commit(&mut self, schema: Value, form_data: Value) -> Result<(), EngineError> {
        let errors = if self.options.live_validate {
            Some(self.validator.validate(&form_data, &schema)?)
        } else {
            None
        };
        self.schema = schema;
        self.form_data = form_data;
        self.id_schema = to_id_schema(&self.schema, &self.options.root_marker);
        if let Some(errors) = errors {
            self.error_schema = to_error_schema(&errors);
            self.errors = errors;
        }
        Ok(())
    }

    /// Applies one edit: evaluates every show entry, then every required
    /// entry, and commits the resulting schema and data together.
    ///
    /// Expression failures do not fail the pass; they are logged and
    /// resolved per entry.
    pub fn on_field_change(&mut self, field_key: &str, value: Value) -> Result<PassReport, EngineError> {
        let mut ctx = build_context(field_key, value, &self.form_data, &self.schema, &self.options)?;
        if ctx.root_write {
            debug!(field_key, "root write, pass skipped");
            return Ok(PassReport {
                field_key: field_key.to_string(),
                root_write: true,
                ..PassReport::default()
            });
        }
        let action = self.action.current();

        let show: Vec<(String, ShowOutcome)> = self
            .conditional_fields
            .values()
            .map(|entry| (entry.key.clone(), evaluate_show(entry, &mut ctx, &action)))
            .collect();
        let required: Vec<(String, RequiredOutcome)> = self
            .conditional_required
            .values()
            .map(|entry| (entry.key.clone(), evaluate_required(entry, &mut ctx, &action)))
            .collect();

        let mutations = ctx.schema.mutations().to_vec();
        self.commit(ctx.schema.into_value(), ctx.row)?;
        debug!(
            field_key,
            show = show.len(),
            required = required.len(),
            mutations = mutations.len(),
            "field change committed"
        );
        Ok(PassReport {
            field_key: field_key.to_string(),
            root_write: false,
            show,
            required,
            mutations,
        })
    }

    /// Issues a change for every leaf of the current form data, so that
    /// loaded data drives visibility and requiredness.
    ///
    /// Objects and arrays are walked; file-like objects and `null` count as
    /// leaves.
    pub fn replay_form_data(&mut self) -> Result<Vec<PassReport>, EngineError> {
        let mut leaves = Vec::new();
        collect_leaves(&self.form_data, FieldPath::root(), &self.options, &mut leaves);
        let mut reports = Vec::with_capacity(leaves.len());
        for (path, value) in leaves {
            let key = path.to_field_key(&self.options.root_marker);
            reports.push(self.on_field_change(&key, value)?);
        }
        debug!(fields = reports.len(), "form data replayed");
        Ok(reports)
    }

    /// Replaces the form data, merged over the schema defaults.
    pub fn set_form_data(&mut self, data: Value) -> Result<(), EngineError> {
        self.load(&data)
    }

    /// Live path of an array schema, from its `schemaPath` and the widget id
    /// of the array field.
    fn array_schema_path(&self, schema_path: &str, element_id: &str) -> Result<FieldPath, EngineError> {
        let indices = FieldPath::from_field_key(element_id, &self.options.root_marker).indices();
        let path = FieldPath::root()
            .child(PROPERTIES)
            .join(&FieldPath::from_dotted(schema_path))
            .substitute(&indices);
        if !path.is_resolved() {
            return Err(PathError::UnresolvedPlaceholder(path.to_dotted()).into());
        }
        match path.get(&self.schema) {
            Some(Value::Object(node)) if node.contains_key(ADDITIONAL_ITEMS) => Ok(path),
            _ => Err(EngineError::NotAnArray(path.to_dotted())),
        }
    }

    fn data_array<'a>(&self, form_data: &'a mut Value, element_id: &str) -> Result<&'a mut Vec<Value>, EngineError> {
        let path = FieldPath::from_field_key(element_id, &self.options.root_marker);
        match path.get_mut(form_data) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(EngineError::NotAnArray(path.to_dotted())),
        }
    }

    /// Appends an element schema, a copy of the array's template, to the
    /// live `items` list. Form data is left to the following change.
    pub fn add_array_item(&mut self, schema_path: &str, element_id: &str) -> Result<(), EngineError> {
        let path = self.array_schema_path(schema_path, element_id)?;
        let template = path
            .child(ADDITIONAL_ITEMS)
            .get(&self.schema)
            .cloned()
            .unwrap_or(Value::Null);
        let items = path.child(ITEMS);
        if let Some(Value::Array(list)) = items.get_mut(&mut self.schema) {
            list.push(template);
        } else {
            items.set(&mut self.schema, Value::Array(vec![template]))?;
        }
        self.id_schema = to_id_schema(&self.schema, &self.options.root_marker);
        Ok(())
    }

    /// Removes element `index` from the array's schema and from the data.
    pub fn remove_array_item(
        &mut self,
        schema_path: &str,
        element_id: &str,
        index: usize,
    ) -> Result<(), EngineError> {
        let path = self.array_schema_path(schema_path, element_id)?;
        let mut form_data = self.form_data.clone();
        let data = self.data_array(&mut form_data, element_id)?;
        if index >= data.len() {
            return Err(EngineError::OutOfBounds {
                index,
                len: data.len(),
            });
        }
        data.remove(index);
        let mut schema = self.schema.clone();
        if let Some(Value::Array(list)) = path.child(ITEMS).get_mut(&mut schema) {
            if index < list.len() {
                list.remove(index);
            }
        }
        self.commit(schema, form_data)
    }

    /// Moves element `from` to position `to` in both schema and data.
    pub fn reorder_array_items(
        &mut self,
        schema_path: &str,
        element_id: &str,
        from: usize,
        to: usize,
    ) -> Result<(), EngineError> {
        let path = self.array_schema_path(schema_path, element_id)?;
        let mut form_data = self.form_data.clone();
        let data = self.data_array(&mut form_data, element_id)?;
        let len = data.len();
        for index in [from, to] {
            if index >= len {
                return Err(EngineError::OutOfBounds { index, len });
            }
        }
        move_item(data, from, to);
        let mut schema = self.schema.clone();
        if let Some(Value::Array(list)) = path.child(ITEMS).get_mut(&mut schema) {
            if from < list.len() && to < list.len() {
                move_item(list, from, to);
            }
        }
        self.commit(schema, form_data)
    }

    /// Runs the validator against the current data and schema and stores
    /// the errors.
    pub fn validate(&mut self) -> Result<&[FieldError], EngineError> {
        self.errors = self.validator.validate(&self.form_data, &self.schema)?;
        self.error_schema = to_error_schema(&self.errors);
        Ok(&self.errors)
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            schema: self.schema.clone(),
            ui_schema: self.ui_schema.clone(),
            id_schema: self.id_schema.clone(),
            form_data: self.form_data.clone(),
            error_schema: self.error_schema.clone(),
        }
    }
}

fn move_item(list: &mut Vec<Value>, from: usize, to: usize) {
    let item = list.remove(from);
    list.insert(to, item);
}

fn collect_leaves(value: &Value, path: FieldPath, options: &EngineOptions, out: &mut Vec<(FieldPath, Value)>) {
    match value {
        Value::Object(map) if !options.is_file_like(value) => {
            for (key, child) in map {
                collect_leaves(child, path.child(Segment::key(key.as_str())), options, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                collect_leaves(child, path.child(index), options, out);
            }
        }
        _ if path.is_root() => {}
        _ => out.push((path, value.clone())),
    }
}

/// Gives every element of loaded array data its own element schema.
fn sync_array_items(schema: &mut Value, data: &Value) {
    let Value::Object(node) = schema else {
        return;
    };
    match data {
        Value::Object(fields) => {
            if let Some(Value::Object(properties)) = node.get_mut(PROPERTIES) {
                for (name, child_data) in fields {
                    if let Some(child_schema) = properties.get_mut(name) {
                        sync_array_items(child_schema, child_data);
                    }
                }
            }
        }
        Value::Array(elements) => {
            let Some(template) = node.get(ADDITIONAL_ITEMS).cloned() else {
                return;
            };
            if let Some(Value::Array(items)) = node.get_mut(ITEMS) {
                while items.len() < elements.len() {
                    items.push(template.clone());
                }
                for (item, element) in items.iter_mut().zip(elements) {
                    sync_array_items(item, element);
                }
            }
        }
        _ => {}
    }
}
