//! Widget id tree.

use crate::adapter::{ITEMS, PROPERTIES};
use serde_json::{json, Map, Value};

/// Builds the id tree of a schema: every object property gets
/// `<parent id>_<name>`.
///
/// Array schemas take the ids of their item schema; element ids are
/// derived by the renderer.
///
/// ```
/// use form_engine::to_id_schema;
/// use serde_json::json;
///
/// let schema = json!({"type": "object", "properties": {
///     "a": {"type": "string"},
///     "b": {"type": "object", "properties": {"c": {"type": "number"}}}
/// }});
/// assert_eq!(
///     to_id_schema(&schema, "root"),
///     json!({"$id": "root", "a": {"$id": "root_a"}, "b": {"$id": "root_b", "c": {"$id": "root_b_c"}}})
/// );
/// ```
pub fn to_id_schema(schema: &Value, id: &str) -> Value {
    if let Some(items) = schema.get(ITEMS) {
        if items.is_object() {
            return to_id_schema(items, id);
        }
        return json!({ "$id": id });
    }
    let mut out = Map::new();
    out.insert("$id".to_string(), Value::String(id.to_string()));
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return Value::Object(out);
    }
    if let Some(Value::Object(properties)) = schema.get(PROPERTIES) {
        for (name, field) in properties {
            out.insert(name.clone(), to_id_schema(field, &format!("{id}_{name}")));
        }
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_items_only_get_an_id() {
        let schema = json!({"type": "object", "properties": {
            "list": {"type": "array", "items": [{"type": "object"}]}
        }});
        assert_eq!(
            to_id_schema(&schema, "root"),
            json!({"$id": "root", "list": {"$id": "root_list"}})
        );
    }

    #[test]
    fn test_single_item_schema_is_followed() {
        let schema = json!({"type": "array", "items": {"type": "object", "properties": {"x": {}}}});
        assert_eq!(
            to_id_schema(&schema, "root_tags"),
            json!({"$id": "root_tags", "x": {"$id": "root_tags_x"}})
        );
    }
}
