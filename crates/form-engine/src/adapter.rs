//! Compiles a field-definition document into the render schema, the UI
//! schema and the two conditional registries.
//!
//! Every field lands in one of two schemas. Fields with a `show` expression,
//! and everything nested under them, go to the conditional schema; the rest
//! go to the primary schema. A conditional field is stored at the top level
//! of the conditional schema under its registry key and copied into the live
//! schema by the show evaluator.
//!
//! Paths are tracked twice while walking: the *storage* path, where the
//! fragment is written, and the *live* path, where the fragment sits in the
//! primary schema once shown. Live paths are abstract: array slots are
//! placeholders.

use crate::config::EngineOptions;
use crate::definition::{FieldDefinition, FieldDocument};
use crate::type_mapping::{self, TypeMapping, GROUP_TYPE};
use form_expression::CompiledExpression;
use form_path::{FieldPath, Segment};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

pub const PROPERTIES: &str = "properties";
pub const REQUIRED: &str = "required";
pub const ITEMS: &str = "items";
pub const ADDITIONAL_ITEMS: &str = "additionalItems";
pub const SCHEMA_PATH: &str = "schemaPath";

/// A field whose presence in the live schema depends on a `show` expression.
#[derive(Debug, Clone)]
pub struct ConditionalField {
    pub key: String,
    pub field_name: String,
    /// Abstract live path of the field's schema, from the schema root.
    pub schema_path: FieldPath,
    /// Abstract live path of the enclosing object schema.
    pub schema_context: FieldPath,
    /// Abstract data path of the object holding the field's value.
    pub context_path: FieldPath,
    /// Fragment inserted into the live schema when shown.
    pub definition: Value,
    pub show: CompiledExpression,
    /// `required: true` on the field itself; applied while it is shown.
    pub statically_required: bool,
}

/// A field whose membership in its `required` list depends on an expression.
#[derive(Debug, Clone)]
pub struct ConditionalRequirement {
    pub key: String,
    pub field_name: String,
    /// Abstract live path of the field's schema, from the schema root.
    pub field_path: FieldPath,
    /// Abstract live path of the schema node owning the `required` list.
    pub schema_context: FieldPath,
    /// Abstract data path of the object holding the field's value.
    pub form_context: FieldPath,
    pub required: CompiledExpression,
}

pub type ConditionalFieldRegistry = IndexMap<String, ConditionalField>;
pub type ConditionalRequiredRegistry = IndexMap<String, ConditionalRequirement>;

#[derive(Debug, Clone)]
pub struct AdaptedSchema {
    pub schema: Value,
    pub ui_schema: Value,
    pub form_data: Value,
    pub conditional_schema: Value,
    pub conditional_fields: Arc<ConditionalFieldRegistry>,
    pub conditional_required: Arc<ConditionalRequiredRegistry>,
}

/// Path of the `required` list owned by the schema node at `context`.
pub fn required_list(context: &FieldPath) -> FieldPath {
    context.child(REQUIRED)
}

/// Live path below the root `properties`, as used by registry keys and
/// `schemaPath`.
pub fn relative_to_properties(path: &FieldPath) -> FieldPath {
    match path.segments().split_first() {
        Some((Segment::Key(first), rest)) if first == PROPERTIES => FieldPath::new(rest.to_vec()),
        _ => path.clone(),
    }
}

/// Registry key of a live schema path, e.g. `list_items_INDEX_properties_email`.
pub fn registry_key(live_path: &FieldPath) -> String {
    relative_to_properties(live_path).to_registry_key()
}

fn empty_schema() -> Value {
    json!({"type": "object", "required": [], "properties": {}})
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Primary,
    Conditional,
}

struct Frame<'a> {
    fields: &'a IndexMap<String, FieldDefinition>,
    /// `properties` node receiving the fields, in the target schema.
    storage_base: FieldPath,
    /// Object node owning `storage_base`, in the target schema.
    storage_context: FieldPath,
    live_base: FieldPath,
    live_context: FieldPath,
    ui_base: FieldPath,
    data_context: FieldPath,
    conditional: bool,
}

impl<'a> Frame<'a> {
    fn root(fields: &'a IndexMap<String, FieldDefinition>) -> Self {
        let properties = FieldPath::root().child(PROPERTIES);
        Frame {
            fields,
            storage_base: properties.clone(),
            storage_context: FieldPath::root(),
            live_base: properties,
            live_context: FieldPath::root(),
            ui_base: FieldPath::root(),
            data_context: FieldPath::root(),
            conditional: false,
        }
    }
}

struct PendingField {
    key: String,
    field_name: String,
    schema_path: FieldPath,
    schema_context: FieldPath,
    context_path: FieldPath,
    show_source: String,
    statically_required: bool,
}

struct Adapter<'a> {
    options: &'a EngineOptions,
    schema: Value,
    ui_schema: Value,
    conditional_schema: Value,
    pending: Vec<PendingField>,
    requirements: ConditionalRequiredRegistry,
}

/// Adapts a field document.
///
/// Never fails: unknown type tags contribute no type, unparsable
/// expressions are kept and fail at evaluation time.
///
/// ```
/// use form_engine::{adapt, EngineOptions, FieldDocument};
/// use serde_json::json;
///
/// let doc = FieldDocument::from_value(json!({"fields": {
///     "a": {"type": "Boolean", "required": true},
///     "b": {"type": "String", "show": "data.a === true"}
/// }})).unwrap();
/// let adapted = adapt(&doc, &EngineOptions::default());
/// assert_eq!(adapted.schema["required"], json!(["a"]));
/// assert!(adapted.schema["properties"].get("b").is_none());
/// assert_eq!(adapted.conditional_schema["properties"]["b"]["type"], "string");
/// assert!(adapted.conditional_fields.contains_key("b"));
/// ```
pub fn adapt(document: &FieldDocument, options: &EngineOptions) -> AdaptedSchema {
    let mut adapter = Adapter {
        options,
        schema: empty_schema(),
        ui_schema: json!({}),
        conditional_schema: empty_schema(),
        pending: Vec::new(),
        requirements: IndexMap::new(),
    };
    adapter.adapt_fields(&Frame::root(&document.fields));
    let adapted = adapter.finish();
    debug!(
        fields = document.fields.len(),
        conditional_fields = adapted.conditional_fields.len(),
        conditional_required = adapted.conditional_required.len(),
        "field document adapted"
    );
    adapted
}

impl Adapter<'_> {
    fn doc(&self, target: Target) -> &Value {
        match target {
            Target::Primary => &self.schema,
            Target::Conditional => &self.conditional_schema,
        }
    }

    fn doc_mut(&mut self, target: Target) -> &mut Value {
        match target {
            Target::Primary => &mut self.schema,
            Target::Conditional => &mut self.conditional_schema,
        }
    }

    fn put(&mut self, target: Target, path: &FieldPath, value: Value) {
        if let Err(err) = path.set(self.doc_mut(target), value) {
            warn!(path = %path, error = %err, "schema write skipped");
        }
    }

    fn put_ui(&mut self, path: &FieldPath, value: Value) {
        if let Err(err) = path.set(&mut self.ui_schema, value) {
            warn!(path = %path, error = %err, "ui schema write skipped");
        }
    }

    fn ensure_required_list(&mut self, target: Target, context: &FieldPath) {
        let list = required_list(context);
        if !list.contains(self.doc(target)) {
            self.put(target, &list, json!([]));
        }
    }

    fn push_required(&mut self, target: Target, context: &FieldPath, name: &str) {
        let list = required_list(context);
        if let Some(Value::Array(names)) = list.get_mut(self.doc_mut(target)) {
            if !names.iter().any(|n| n.as_str() == Some(name)) {
                names.push(Value::String(name.to_string()));
            }
            return;
        }
        self.put(target, &list, json!([name]));
    }

    fn adapt_fields(&mut self, frame: &Frame<'_>) {
        let mut entries: Vec<(&String, &FieldDefinition)> = frame
            .fields
            .iter()
            .filter(|(_, field)| field.show_in_form)
            .collect();
        // stable: declaration order is kept within each group
        entries.sort_by_key(|(_, field)| !field.is_statically_required());
        for (name, field) in entries {
            self.adapt_field(frame, name, field);
        }
    }

    fn adapt_field(&mut self, frame: &Frame<'_>, name: &str, field: &FieldDefinition) {
        let type_tag = field.type_tag();
        if type_tag == Some(GROUP_TYPE) {
            return;
        }
        let mapping = type_tag.and_then(type_mapping::lookup);
        if mapping.is_none() {
            debug!(field = name, type_tag, "no type mapping");
        }

        let show_source = field.show_expression();
        let is_conditional = show_source.is_some();
        let in_conditional = is_conditional || frame.conditional;
        let target = if in_conditional {
            Target::Conditional
        } else {
            Target::Primary
        };

        let live_path = frame.live_base.child(Segment::key(name));
        let key = registry_key(&live_path);
        let storage_path = if is_conditional {
            FieldPath::root()
                .child(PROPERTIES)
                .child(Segment::key(key.clone()))
        } else {
            frame.storage_base.child(Segment::key(name))
        };
        let ui_path = frame.ui_base.child(Segment::key(name));

        self.put(
            target,
            &storage_path,
            fragment(field, name, &frame.data_context, mapping),
        );
        if let Some(ui) = mapping.and_then(|m| m.ui_schema.clone()) {
            self.put_ui(&ui_path, ui);
        }

        if !is_conditional {
            if !frame.storage_context.is_root() {
                self.ensure_required_list(target, &frame.storage_context);
            }
            if field.is_statically_required() {
                self.push_required(target, &frame.storage_context, name);
            }
        }
        if let Some(source) = field.required_expression() {
            let required = CompiledExpression::compile(source, &self.options.parse_options());
            if let Some(err) = required.parse_error() {
                warn!(key = %key, error = %err, "required expression does not parse");
            }
            self.requirements.insert(
                key.clone(),
                ConditionalRequirement {
                    key: key.clone(),
                    field_name: name.to_string(),
                    field_path: live_path.clone(),
                    schema_context: frame.live_context.clone(),
                    form_context: frame.data_context.clone(),
                    required,
                },
            );
        }

        self.copy_metadata(target, &storage_path, &ui_path, field);

        if let Some(source) = show_source {
            self.pending.push(PendingField {
                key,
                field_name: name.to_string(),
                schema_path: live_path.clone(),
                schema_context: frame.live_context.clone(),
                context_path: frame.data_context.clone(),
                show_source: source.to_string(),
                statically_required: field.is_statically_required(),
            });
        }

        let (Some(children), Some(mapping)) = (&field.fields, mapping) else {
            return;
        };
        let data_path = frame.data_context.child(Segment::key(name));
        match mapping.schema_type() {
            Some("object") => self.adapt_fields(&Frame {
                fields: children,
                storage_base: storage_path.child(PROPERTIES),
                storage_context: storage_path,
                live_base: live_path.child(PROPERTIES),
                live_context: live_path,
                ui_base: ui_path,
                data_context: data_path,
                conditional: in_conditional,
            }),
            Some("array") => {
                let item_storage = storage_path.child(ITEMS).child(0usize);
                let item_live = live_path.child(ITEMS).child(Segment::Placeholder);
                let item_ui = ui_path.child(ITEMS).child(0usize);
                self.put(target, &storage_path.child(ITEMS), json!([{"type": "object"}]));
                self.adapt_fields(&Frame {
                    fields: children,
                    storage_base: item_storage.child(PROPERTIES),
                    storage_context: item_storage.clone(),
                    live_base: item_live.child(PROPERTIES),
                    live_context: item_live,
                    ui_base: item_ui.clone(),
                    data_context: data_path.child(Segment::Placeholder),
                    conditional: in_conditional,
                });

                let template = item_storage
                    .get(self.doc(target))
                    .cloned()
                    .unwrap_or_else(|| json!({"type": "object"}));
                self.put(target, &storage_path.child(ADDITIONAL_ITEMS), template);
                let schema_path = relative_to_properties(&live_path).to_dotted();
                self.put(target, &storage_path.child(SCHEMA_PATH), Value::String(schema_path));
                if let Some(ui_template) = item_ui.get(&self.ui_schema).cloned() {
                    self.put_ui(&ui_path.child(ADDITIONAL_ITEMS), ui_template);
                }
            }
            _ => debug!(field = name, "nested fields ignored on a scalar type"),
        }
    }

    fn copy_metadata(
        &mut self,
        target: Target,
        storage_path: &FieldPath,
        ui_path: &FieldPath,
        field: &FieldDefinition,
    ) {
        if let Some(list) = &field.list {
            self.put(target, &storage_path.child("list"), list.clone());
            let widget = if list.get("url").is_some() && list.get("method").is_some() {
                "dynamic-list"
            } else {
                "list-select"
            };
            self.put_ui(&ui_path.child(Segment::key("ui:widget")), json!(widget));
        }
        let copies = [
            ("lookup", field.lookup.as_ref()),
            ("orderable", field.reordering()),
            ("formWidth", field.form_width.as_ref()),
            ("arguments", field.arguments.as_ref()),
            ("fieldInfo", field.field_info.as_ref()),
        ];
        for (name, value) in copies {
            if let Some(value) = value {
                self.put(target, &storage_path.child(name), value.clone());
            }
        }
        if let Some(options) = field.options() {
            let path = storage_path.child("parameters").child("options");
            self.put(target, &path, options.clone());
        }
        if let Some(show) = &field.show {
            self.put(target, &storage_path.child("show"), show.to_value());
        }
    }

    fn finish(self) -> AdaptedSchema {
        let Adapter {
            options,
            schema,
            ui_schema,
            conditional_schema,
            pending,
            requirements,
        } = self;
        let parse_options = options.parse_options();
        let mut fields = ConditionalFieldRegistry::new();
        for entry in pending {
            let definition = FieldPath::root()
                .child(PROPERTIES)
                .child(Segment::key(entry.key.clone()))
                .get(&conditional_schema)
                .cloned()
                .unwrap_or_else(|| json!({}));
            let show = CompiledExpression::compile(&entry.show_source, &parse_options);
            if let Some(err) = show.parse_error() {
                warn!(key = %entry.key, error = %err, "show expression does not parse");
            }
            fields.insert(
                entry.key.clone(),
                ConditionalField {
                    key: entry.key,
                    field_name: entry.field_name,
                    schema_path: entry.schema_path,
                    schema_context: entry.schema_context,
                    context_path: entry.context_path,
                    definition,
                    show,
                    statically_required: entry.statically_required,
                },
            );
        }
        AdaptedSchema {
            schema,
            ui_schema,
            form_data: json!({}),
            conditional_schema,
            conditional_fields: Arc::new(fields),
            conditional_required: Arc::new(requirements),
        }
    }
}

fn fragment(
    field: &FieldDefinition,
    name: &str,
    data_context: &FieldPath,
    mapping: Option<&TypeMapping>,
) -> Value {
    let mut out = Map::new();
    if let Some(title) = &field.full_name {
        out.insert("title".to_string(), Value::String(title.clone()));
    }
    out.insert(
        "contextPath".to_string(),
        Value::String(data_context.to_dotted()),
    );
    out.insert("fieldName".to_string(), Value::String(name.to_string()));
    if let Some(Value::Object(schema)) = mapping.map(|m| &m.schema) {
        for (key, value) in schema {
            out.insert(key.clone(), value.clone());
        }
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapt_json(fields: Value) -> AdaptedSchema {
        let doc = FieldDocument::from_value(json!({ "fields": fields })).unwrap();
        adapt(&doc, &EngineOptions::default())
    }

    #[test]
    fn test_required_first_and_unique() {
        let adapted = adapt_json(json!({
            "x": {"type": "String"},
            "y": {"type": "String", "required": true},
            "z": {"type": "Number", "required": true}
        }));
        let order: Vec<&String> = adapted.schema["properties"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(order, ["y", "z", "x"]);
        assert_eq!(adapted.schema["required"], json!(["y", "z"]));
    }

    #[test]
    fn test_fragment_shape() {
        let adapted = adapt_json(json!({
            "site": {"type": "Url", "fullName": "Web site", "formWidth": 6}
        }));
        assert_eq!(
            adapted.schema["properties"]["site"],
            json!({
                "title": "Web site",
                "contextPath": "",
                "fieldName": "site",
                "type": "string",
                "format": "uri",
                "formWidth": 6
            })
        );
    }

    #[test]
    fn test_hidden_and_group_fields_are_dropped() {
        let adapted = adapt_json(json!({
            "a": {"type": "String", "showInForm": false},
            "g": {"type": "Group"},
            "b": {"type": "String"}
        }));
        let props = adapted.schema["properties"].as_object().unwrap();
        assert_eq!(props.len(), 1);
        assert!(props.contains_key("b"));
    }

    #[test]
    fn test_unknown_type_still_gets_a_fragment() {
        let adapted = adapt_json(json!({"a": {"type": "Hologram"}}));
        assert_eq!(
            adapted.schema["properties"]["a"],
            json!({"contextPath": "", "fieldName": "a"})
        );
    }

    #[test]
    fn test_nested_object() {
        let adapted = adapt_json(json!({
            "address": {"type": "Object", "fields": {
                "city": {"type": "String", "required": true},
                "zip": {"type": "String"}
            }}
        }));
        let address = &adapted.schema["properties"]["address"];
        assert_eq!(address["type"], "object");
        assert_eq!(address["required"], json!(["city"]));
        assert_eq!(address["properties"]["zip"]["contextPath"], "address");
        assert_eq!(adapted.schema["required"], json!([]));
    }

    #[test]
    fn test_list_widget() {
        let adapted = adapt_json(json!({
            "a": {"type": "String", "list": {"url": "/api", "method": "GET"}},
            "b": {"type": "String", "list": ["x", "y"]}
        }));
        assert_eq!(adapted.ui_schema["a"]["ui:widget"], "dynamic-list");
        assert_eq!(adapted.ui_schema["b"]["ui:widget"], "list-select");
        assert_eq!(adapted.schema["properties"]["b"]["list"], json!(["x", "y"]));
    }

    #[test]
    fn test_parameters_are_copied() {
        let adapted = adapt_json(json!({
            "tags": {"type": "Object[]", "parameters": {"reordering": true, "options": {"max": 2}}}
        }));
        let tags = &adapted.schema["properties"]["tags"];
        assert_eq!(tags["orderable"], true);
        assert_eq!(tags["parameters"], json!({"options": {"max": 2}}));
    }

    #[test]
    fn test_registry_key_strips_root_properties() {
        let live = FieldPath::from_dotted("properties.list.items.INDEX.properties.email");
        assert_eq!(registry_key(&live), "list_items_INDEX_properties_email");
        assert_eq!(
            relative_to_properties(&live).to_dotted(),
            "list.items.INDEX.properties.email"
        );
    }

    #[test]
    fn test_statically_required_conditional_field_is_flagged() {
        let adapted = adapt_json(json!({
            "a": {"type": "String", "required": true, "show": "row.b === 1"}
        }));
        assert_eq!(adapted.schema["required"], json!([]));
        assert_eq!(adapted.conditional_schema["required"], json!([]));
        assert!(adapted.conditional_fields["a"].statically_required);
    }
}
