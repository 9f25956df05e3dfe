//! The field-definition document the adapter consumes.

use crate::error::EngineError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Either a literal flag or an expression source.
///
/// Used for both `required` and `show`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Flag(bool),
    Expression(String),
}

impl Condition {
    pub fn is_true(&self) -> bool {
        matches!(self, Condition::Flag(true))
    }

    pub fn expression(&self) -> Option<&str> {
        match self {
            Condition::Expression(source) => Some(source),
            Condition::Flag(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Condition::Flag(flag) => Value::Bool(*flag),
            Condition::Expression(source) => Value::String(source.clone()),
        }
    }
}

/// One field of a data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub required: Option<Condition>,
    #[serde(default)]
    pub show: Option<Condition>,
    #[serde(default)]
    pub fields: Option<IndexMap<String, FieldDefinition>>,
    #[serde(default)]
    pub list: Option<Value>,
    #[serde(default)]
    pub lookup: Option<Value>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub form_width: Option<Value>,
    #[serde(default = "default_show_in_form")]
    pub show_in_form: bool,
    #[serde(default)]
    pub parameters: Option<Value>,
    #[serde(default)]
    pub arguments: Option<Value>,
    #[serde(default)]
    pub field_info: Option<Value>,
}

fn default_show_in_form() -> bool {
    true
}

impl FieldDefinition {
    /// The tag used for the type lookup. `subtype` wins over `type`.
    pub fn type_tag(&self) -> Option<&str> {
        self.subtype.as_deref().or(self.field_type.as_deref())
    }

    pub fn is_statically_required(&self) -> bool {
        self.required.as_ref().is_some_and(Condition::is_true)
    }

    pub fn required_expression(&self) -> Option<&str> {
        self.required.as_ref().and_then(Condition::expression)
    }

    pub fn show_expression(&self) -> Option<&str> {
        self.show.as_ref().and_then(Condition::expression)
    }

    fn parameter(&self, key: &str) -> Option<&Value> {
        self.parameters.as_ref().and_then(|p| p.get(key))
    }

    pub fn reordering(&self) -> Option<&Value> {
        self.parameter("reordering")
    }

    pub fn options(&self) -> Option<&Value> {
        self.parameter("options")
    }
}

/// The top-level document: an ordered map of field name to definition.
///
/// ```
/// use form_engine::FieldDocument;
///
/// let doc = FieldDocument::from_json(r#"{"fields": {
///     "b": {"type": "String", "show": "data.a === true"},
///     "a": {"type": "Boolean", "required": true}
/// }}"#).unwrap();
/// let names: Vec<&str> = doc.fields.keys().map(String::as_str).collect();
/// assert_eq!(names, ["b", "a"]);
/// assert_eq!(doc.fields["b"].show_expression(), Some("data.a === true"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDocument {
    #[serde(default)]
    pub fields: IndexMap<String, FieldDefinition>,
}

impl FieldDocument {
    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_value(value: Value) -> Result<Self, EngineError> {
        Ok(serde_json::from_value(value)?)
    }
}
