//! Reading and writing JSON documents by [`FieldPath`].

use crate::error::PathError;
use crate::types::{FieldPath, Segment};
use serde_json::{Map, Value};

fn step<'a>(current: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (current, segment) {
        (Value::Object(map), Segment::Key(key)) => map.get(key),
        (Value::Object(map), Segment::Index(index)) => map.get(&index.to_string()),
        (Value::Array(arr), Segment::Index(index)) => arr.get(*index),
        _ => None,
    }
}

fn step_mut<'a>(current: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match (current, segment) {
        (Value::Object(map), Segment::Key(key)) => map.get_mut(key),
        (Value::Object(map), Segment::Index(index)) => map.get_mut(&index.to_string()),
        (Value::Array(arr), Segment::Index(index)) => arr.get_mut(*index),
        _ => None,
    }
}

/// Returns the child slot for `segment`, creating it (and converting
/// `container` into the matching container type) when missing.
fn slot<'a>(container: &'a mut Value, segment: &Segment) -> Result<&'a mut Value, PathError> {
    match segment {
        Segment::Placeholder => Err(PathError::UnresolvedPlaceholder(segment.to_string())),
        Segment::Key(key) => {
            if !container.is_object() {
                *container = Value::Object(Map::new());
            }
            match container {
                Value::Object(map) => Ok(map.entry(key.clone()).or_insert(Value::Null)),
                _ => Err(PathError::NotContainer(key.clone())),
            }
        }
        Segment::Index(index) => {
            // An existing object keeps its shape and gets a numeric key.
            if !container.is_object() && !container.is_array() {
                *container = Value::Array(Vec::new());
            }
            match container {
                Value::Object(map) => Ok(map.entry(index.to_string()).or_insert(Value::Null)),
                Value::Array(arr) => {
                    if arr.len() <= *index {
                        arr.resize(index + 1, Value::Null);
                    }
                    Ok(&mut arr[*index])
                }
                _ => Err(PathError::NotContainer(index.to_string())),
            }
        }
    }
}

impl FieldPath {
    /// Looks up the addressed value.
    ///
    /// Paths with unresolved placeholders address nothing.
    ///
    /// ```
    /// use form_path::FieldPath;
    /// use serde_json::json;
    ///
    /// let doc = json!({"list": [{"name": "a"}, {"name": "b"}]});
    /// assert_eq!(FieldPath::from_dotted("list.1.name").get(&doc), Some(&json!("b")));
    /// assert_eq!(FieldPath::from_dotted("list.INDEX.name").get(&doc), None);
    /// ```
    pub fn get<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        let mut current = doc;
        for segment in self.segments() {
            current = step(current, segment)?;
        }
        Some(current)
    }

    pub fn get_mut<'a>(&self, doc: &'a mut Value) -> Option<&'a mut Value> {
        let mut current = doc;
        for segment in self.segments() {
            current = step_mut(current, segment)?;
        }
        Some(current)
    }

    /// True when a value (including an explicit `null`) exists at the path.
    pub fn contains(&self, doc: &Value) -> bool {
        self.get(doc).is_some()
    }

    /// Writes `value`, creating intermediate containers as needed.
    ///
    /// A missing container becomes an array when the step into it is an
    /// index and an object otherwise. Scalars standing in the way are
    /// replaced.
    ///
    /// ```
    /// use form_path::FieldPath;
    /// use serde_json::json;
    ///
    /// let mut doc = json!({});
    /// FieldPath::from_dotted("list.1.name").set(&mut doc, json!("x")).unwrap();
    /// assert_eq!(doc, json!({"list": [null, {"name": "x"}]}));
    /// ```
    pub fn set(&self, doc: &mut Value, value: Value) -> Result<(), PathError> {
        if !self.is_resolved() {
            return Err(PathError::UnresolvedPlaceholder(self.to_dotted()));
        }
        let mut current = doc;
        for segment in self.segments() {
            current = slot(current, segment)?;
        }
        *current = value;
        Ok(())
    }

    /// Deletes the addressed value and returns it.
    ///
    /// Object entries are removed, keeping the order of their siblings.
    /// Array slots are nulled so that sibling indices stay stable. Removing
    /// the root resets the document to `null`.
    pub fn remove(&self, doc: &mut Value) -> Result<Option<Value>, PathError> {
        if !self.is_resolved() {
            return Err(PathError::UnresolvedPlaceholder(self.to_dotted()));
        }
        let Some(last) = self.last() else {
            return Ok(Some(std::mem::take(doc)));
        };
        let Some(container) = self.parent_context().get_mut(doc) else {
            return Ok(None);
        };
        let removed = match (container, last) {
            (Value::Object(map), Segment::Key(key)) => map.shift_remove(key),
            (Value::Object(map), Segment::Index(index)) => map.shift_remove(&index.to_string()),
            (Value::Array(arr), Segment::Index(index)) => {
                arr.get_mut(*index).map(std::mem::take)
            }
            _ => None,
        };
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_root_replaces_document() {
        let mut doc = json!({"a": 1});
        FieldPath::root().set(&mut doc, json!([1])).unwrap();
        assert_eq!(doc, json!([1]));
    }

    #[test]
    fn test_set_replaces_scalar_in_the_way() {
        let mut doc = json!({"a": 5});
        FieldPath::from_dotted("a.b").set(&mut doc, json!(true)).unwrap();
        assert_eq!(doc, json!({"a": {"b": true}}));
    }

    #[test]
    fn test_set_index_on_existing_object_uses_numeric_key() {
        let mut doc = json!({"a": {"x": 1}});
        FieldPath::from_dotted("a.0").set(&mut doc, json!(2)).unwrap();
        assert_eq!(doc, json!({"a": {"x": 1, "0": 2}}));
    }

    #[test]
    fn test_set_rejects_placeholder() {
        let mut doc = json!({});
        let err = FieldPath::from_dotted("a.INDEX").set(&mut doc, json!(1)).unwrap_err();
        assert_eq!(err, PathError::UnresolvedPlaceholder("a.INDEX".to_string()));
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn test_remove_missing_is_none() {
        let mut doc = json!({"a": {}});
        assert_eq!(FieldPath::from_dotted("a.b").remove(&mut doc).unwrap(), None);
        assert_eq!(FieldPath::from_dotted("x.b").remove(&mut doc).unwrap(), None);
    }

    #[test]
    fn test_remove_array_slot_keeps_length() {
        let mut doc = json!({"a": [1, 2, 3]});
        let removed = FieldPath::from_dotted("a.1").remove(&mut doc).unwrap();
        assert_eq!(removed, Some(json!(2)));
        assert_eq!(doc, json!({"a": [1, null, 3]}));
    }

    #[test]
    fn test_get_explicit_null_exists() {
        let doc = json!({"a": null});
        assert!(FieldPath::from_dotted("a").contains(&doc));
        assert!(!FieldPath::from_dotted("b").contains(&doc));
    }
}
