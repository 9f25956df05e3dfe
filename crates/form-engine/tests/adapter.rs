//! Integration tests for schema adaptation.

use form_engine::{adapt, AdaptedSchema, EngineOptions, FieldDocument};
use form_path::FieldPath;
use serde_json::{json, Value};

fn adapt_fields(fields: Value) -> AdaptedSchema {
    let doc = FieldDocument::from_value(json!({ "fields": fields })).unwrap();
    adapt(&doc, &EngineOptions::default())
}

// ----------------------------------------------------------------- Arrays

#[test]
fn test_array_gets_exactly_one_template() {
    let adapted = adapt_fields(json!({
        "list": {"type": "Object[]", "fields": {"x": {"type": "Number"}}}
    }));
    let list = &adapted.schema["properties"]["list"];
    let item = json!({
        "type": "object",
        "properties": {"x": {"contextPath": "list.INDEX", "fieldName": "x", "type": "number"}},
        "required": []
    });
    assert_eq!(list["items"], json!([item.clone()]));
    assert_eq!(list["additionalItems"], item);
    assert_eq!(list["schemaPath"], "list");
}

#[test]
fn test_nested_array_schema_path_is_abstract() {
    let adapted = adapt_fields(json!({
        "outer": {"type": "Object[]", "fields": {
            "inner": {"type": "Object[]", "fields": {"y": {"type": "String"}}}
        }}
    }));
    let inner = &adapted.schema["properties"]["outer"]["additionalItems"]["properties"]["inner"];
    assert_eq!(inner["schemaPath"], "outer.items.INDEX.properties.inner");
    assert_eq!(
        inner["additionalItems"]["properties"]["y"]["contextPath"],
        "outer.INDEX.inner.INDEX"
    );
}

#[test]
fn test_array_ui_template() {
    let adapted = adapt_fields(json!({
        "list": {"type": "Object[]", "fields": {"notes": {"type": "Text"}}}
    }));
    let ui = &adapted.ui_schema["list"];
    assert_eq!(ui["items"], json!([{"notes": {"ui:widget": "textarea"}}]));
    assert_eq!(ui["additionalItems"], json!({"notes": {"ui:widget": "textarea"}}));
}

// ----------------------------------------------------------------- Conditional fields

#[test]
fn test_conditional_field_in_array() {
    let adapted = adapt_fields(json!({
        "list": {"type": "Object[]", "fields": {
            "kind": {"type": "String"},
            "email": {"type": "String", "show": "data.kind === 'email'"}
        }}
    }));
    let key = "list_items_INDEX_properties_email";
    let entry = &adapted.conditional_fields[key];
    assert_eq!(entry.field_name, "email");
    assert_eq!(
        entry.schema_path,
        FieldPath::from_dotted("properties.list.items.INDEX.properties.email")
    );
    assert_eq!(entry.schema_context, FieldPath::from_dotted("properties.list.items.INDEX"));
    assert_eq!(entry.context_path, FieldPath::from_dotted("list.INDEX"));
    assert_eq!(entry.definition["type"], "string");
    assert_eq!(entry.definition["show"], "data.kind === 'email'");
    assert!(entry.show.is_valid());

    // not in the live template
    let template = &adapted.schema["properties"]["list"]["additionalItems"];
    assert!(template["properties"].get("email").is_none());
    assert_eq!(adapted.conditional_schema["properties"][key], entry.definition);
}

#[test]
fn test_children_of_conditional_object_travel_with_it() {
    let adapted = adapt_fields(json!({
        "flag": {"type": "Boolean"},
        "details": {"type": "Object", "show": "row.flag === true", "fields": {
            "note": {"type": "String", "required": true},
            "extra": {"type": "String", "show": "data.note === 'more'"}
        }}
    }));
    assert!(adapted.schema["properties"].get("details").is_none());

    let details = &adapted.conditional_fields["details"].definition;
    assert_eq!(details["required"], json!(["note"]));
    assert_eq!(details["properties"]["note"]["contextPath"], "details");
    assert!(details["properties"].get("extra").is_none());

    let extra = &adapted.conditional_fields["details_properties_extra"];
    assert_eq!(
        extra.schema_path,
        FieldPath::from_dotted("properties.details.properties.extra")
    );
    let keys: Vec<&String> = adapted.conditional_fields.keys().collect();
    assert_eq!(keys, ["details", "details_properties_extra"]);
}

#[test]
fn test_unparsable_show_is_kept() {
    let adapted = adapt_fields(json!({"a": {"type": "String", "show": "data.a ==="}}));
    let entry = &adapted.conditional_fields["a"];
    assert!(!entry.show.is_valid());
    assert_eq!(entry.show.source(), "data.a ===");
}

#[test]
fn test_literal_show_flag_is_not_conditional() {
    let adapted = adapt_fields(json!({"a": {"type": "String", "show": false}}));
    assert!(adapted.conditional_fields.is_empty());
    assert_eq!(adapted.schema["properties"]["a"]["show"], false);
}

// ----------------------------------------------------------------- Required

#[test]
fn test_required_expression_registry() {
    let adapted = adapt_fields(json!({
        "list": {"type": "Object[]", "fields": {
            "code": {"type": "String", "required": "data.kind === 'x'"}
        }},
        "top": {"type": "String", "required": "row.a > 1"}
    }));
    let code = &adapted.conditional_required["list_items_INDEX_properties_code"];
    assert_eq!(code.field_name, "code");
    assert_eq!(
        code.field_path,
        FieldPath::from_dotted("properties.list.items.INDEX.properties.code")
    );
    assert_eq!(code.schema_context, FieldPath::from_dotted("properties.list.items.INDEX"));
    assert_eq!(code.form_context, FieldPath::from_dotted("list.INDEX"));

    let top = &adapted.conditional_required["top"];
    assert!(top.schema_context.is_root());
    assert!(top.form_context.is_root());
    assert_eq!(adapted.schema["required"], json!([]));
}

#[test]
fn test_required_first_within_nested_levels() {
    let adapted = adapt_fields(json!({
        "list": {"type": "Object[]", "fields": {
            "b": {"type": "String"},
            "a": {"type": "String", "required": true}
        }}
    }));
    let item = &adapted.schema["properties"]["list"]["additionalItems"];
    let order: Vec<&String> = item["properties"].as_object().unwrap().keys().collect();
    assert_eq!(order, ["a", "b"]);
    assert_eq!(item["required"], json!(["a"]));
}

// ----------------------------------------------------------------- Metadata

#[test]
fn test_type_mappings_with_ui() {
    let adapted = adapt_fields(json!({
        "photo": {"type": "Image"},
        "owner": {"type": "LookupObjectID", "lookup": {"table": "users"}},
        "tags": {"type": "String[]"},
        "when": {"type": "DateTime"}
    }));
    let props = &adapted.schema["properties"];
    assert_eq!(props["photo"]["contentType"], "image/*");
    assert_eq!(props["owner"]["lookup"], json!({"table": "users"}));
    assert_eq!(props["tags"]["items"], json!({"type": "string"}));
    assert_eq!(props["when"]["format"], "date-time");
    assert_eq!(
        adapted.ui_schema,
        json!({
            "photo": {"ui:widget": "file"},
            "owner": {"ui:widget": "lookup-select"},
            "tags": {"ui:widget": "tags"}
        })
    );
}

#[test]
fn test_pass_through_metadata() {
    let adapted = adapt_fields(json!({
        "a": {
            "type": "String",
            "arguments": {"min": 1},
            "fieldInfo": "help text",
            "parameters": {"ignored": true}
        }
    }));
    let a = &adapted.schema["properties"]["a"];
    assert_eq!(a["arguments"], json!({"min": 1}));
    assert_eq!(a["fieldInfo"], "help text");
    assert!(a.get("parameters").is_none());
    assert_eq!(adapted.form_data, json!({}));
}
