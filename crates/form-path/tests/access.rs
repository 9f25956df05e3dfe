use form_path::{FieldPath, PathError};
use serde_json::json;

#[test]
fn test_get_through_arrays_and_objects() {
    let doc = json!({"a": [{"b": {"c": 1}}, {"b": {"c": 2}}]});
    assert_eq!(FieldPath::from_dotted("a.1.b.c").get(&doc), Some(&json!(2)));
    assert_eq!(FieldPath::from_dotted("a.2.b.c").get(&doc), None);
    assert_eq!(FieldPath::from_dotted("a.x").get(&doc), None);
    assert_eq!(FieldPath::root().get(&doc), Some(&doc));
}

#[test]
fn test_set_pads_arrays_with_null() {
    let mut doc = json!({"list": [1]});
    FieldPath::from_dotted("list.3").set(&mut doc, json!(4)).unwrap();
    assert_eq!(doc, json!({"list": [1, null, null, 4]}));
}

#[test]
fn test_set_creates_nested_containers() {
    let mut doc = json!(null);
    FieldPath::from_dotted("a.0.b").set(&mut doc, json!("x")).unwrap();
    assert_eq!(doc, json!({"a": [{"b": "x"}]}));
}

#[test]
fn test_get_mut_edits_in_place() {
    let mut doc = json!({"a": {"b": 1}});
    if let Some(slot) = FieldPath::from_dotted("a.b").get_mut(&mut doc) {
        *slot = json!(2);
    }
    assert_eq!(doc, json!({"a": {"b": 2}}));
}

#[test]
fn test_remove_keeps_sibling_order() {
    let mut doc = json!({"z": 1, "a": 2, "m": 3});
    let removed = FieldPath::from_dotted("a").remove(&mut doc).unwrap();
    assert_eq!(removed, Some(json!(2)));
    let keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["z", "m"]);
}

#[test]
fn test_remove_unresolved_is_error() {
    let mut doc = json!({"a": [1]});
    assert_eq!(
        FieldPath::from_dotted("a.INDEX").remove(&mut doc),
        Err(PathError::UnresolvedPlaceholder("a.INDEX".to_string()))
    );
}
