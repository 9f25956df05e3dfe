//! Static table from field type tags to schema and UI fragments.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// Layout-only fields; the adapter skips them.
pub const GROUP_TYPE: &str = "Group";

#[derive(Debug, Clone, PartialEq)]
pub struct TypeMapping {
    pub schema: Value,
    pub ui_schema: Option<Value>,
}

impl TypeMapping {
    fn new(schema: Value) -> Self {
        TypeMapping {
            schema,
            ui_schema: None,
        }
    }

    fn with_ui(schema: Value, ui_schema: Value) -> Self {
        TypeMapping {
            schema,
            ui_schema: Some(ui_schema),
        }
    }

    /// The JSON Schema `type` of the mapped fragment.
    pub fn schema_type(&self) -> Option<&str> {
        self.schema.get("type").and_then(Value::as_str)
    }
}

static TYPE_MAPPINGS: Lazy<IndexMap<&'static str, TypeMapping>> = Lazy::new(|| {
    let file = || json!({"ui:widget": "file"});
    let objects = || json!({"type": "array", "items": {"type": "object"}});
    let mut table = IndexMap::new();
    table.insert(
        "DynamicList",
        TypeMapping::with_ui(json!({"type": "string"}), json!({"ui:widget": "dynamic-list"})),
    );
    table.insert("Number", TypeMapping::new(json!({"type": "number"})));
    table.insert("String", TypeMapping::new(json!({"type": "string"})));
    table.insert("Url", TypeMapping::new(json!({"type": "string", "format": "uri"})));
    table.insert(
        "Text",
        TypeMapping::with_ui(json!({"type": "string"}), json!({"ui:widget": "textarea"})),
    );
    table.insert("Object", TypeMapping::new(json!({"type": "object"})));
    table.insert("Array", TypeMapping::new(json!({"type": "array"})));
    table.insert("File", TypeMapping::with_ui(json!({"type": "object"}), file()));
    table.insert("File[]", TypeMapping::with_ui(objects(), file()));
    table.insert("Date", TypeMapping::new(json!({"type": "string", "format": "date"})));
    table.insert(
        "DateTime",
        TypeMapping::new(json!({"type": "string", "format": "date-time"})),
    );
    table.insert("Boolean", TypeMapping::new(json!({"type": "boolean"})));
    table.insert("Mixed", TypeMapping::new(json!({"type": "object"})));
    table.insert("ObjectID", TypeMapping::new(json!({"type": "string"})));
    table.insert(
        "LookupObjectID",
        TypeMapping::with_ui(json!({"type": "string"}), json!({"ui:widget": "lookup-select"})),
    );
    table.insert(
        "String[]",
        TypeMapping::with_ui(
            json!({"type": "array", "items": {"type": "string"}}),
            json!({"ui:widget": "tags"}),
        ),
    );
    table.insert(
        "Date[]",
        TypeMapping::new(json!({"type": "array", "items": {"type": "string", "format": "date"}})),
    );
    table.insert(
        "DateTime[]",
        TypeMapping::new(
            json!({"type": "array", "items": {"type": "string", "format": "date-time"}}),
        ),
    );
    table.insert(
        "Number[]",
        TypeMapping::new(json!({"type": "array", "items": {"type": "number"}})),
    );
    table.insert(
        "Boolean[]",
        TypeMapping::new(json!({"type": "array", "items": {"type": "boolean"}})),
    );
    table.insert("Mixed[]", TypeMapping::new(objects()));
    table.insert("Object[]", TypeMapping::new(objects()));
    table.insert(
        "ObjectID[]",
        TypeMapping::new(json!({"type": "array", "items": {"type": "string"}})),
    );
    table.insert(
        "LookupObjectID[]",
        TypeMapping::with_ui(
            json!({"type": "string"}),
            json!({"ui:widget": "multi-lookup-select"}),
        ),
    );
    table.insert(
        "Image",
        TypeMapping::with_ui(json!({"type": "object", "contentType": "image/*"}), file()),
    );
    table.insert("Video", TypeMapping::with_ui(json!({"type": "object"}), file()));
    table.insert("Audio", TypeMapping::with_ui(json!({"type": "object"}), file()));
    table.insert(
        "Image[]",
        TypeMapping::with_ui(
            json!({"type": "array", "contentType": "image/*", "items": {"type": "object"}}),
            file(),
        ),
    );
    table.insert("Video[]", TypeMapping::with_ui(objects(), file()));
    table.insert("Audio[]", TypeMapping::with_ui(objects(), file()));
    table
});

/// Looks up the mapping for a type tag.
///
/// ```
/// use form_engine::type_mapping::lookup;
/// use serde_json::json;
///
/// let text = lookup("Text").unwrap();
/// assert_eq!(text.schema, json!({"type": "string"}));
/// assert_eq!(text.ui_schema, Some(json!({"ui:widget": "textarea"})));
/// assert!(lookup("Whatever").is_none());
/// ```
pub fn lookup(type_tag: &str) -> Option<&'static TypeMapping> {
    TYPE_MAPPINGS.get(type_tag)
}

/// All known type tags, in table order.
pub fn type_tags() -> impl Iterator<Item = &'static str> {
    TYPE_MAPPINGS.keys().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mapping_has_a_type() {
        for tag in type_tags() {
            let mapping = lookup(tag).unwrap();
            assert!(mapping.schema_type().is_some(), "{tag} has no type");
        }
    }

    #[test]
    fn test_array_mappings() {
        assert_eq!(lookup("Object[]").unwrap().schema_type(), Some("array"));
        assert_eq!(lookup("Image[]").unwrap().schema["contentType"], "image/*");
        // multi lookups hold a delimited string, not an array
        assert_eq!(lookup("LookupObjectID[]").unwrap().schema_type(), Some("string"));
    }

    #[test]
    fn test_group_is_not_mapped() {
        assert!(lookup(GROUP_TYPE).is_none());
    }
}
