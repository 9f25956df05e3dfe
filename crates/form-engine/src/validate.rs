//! Validation contract and error shaping.
//!
//! Validators report flat errors whose `property` is a JavaScript-style
//! accessor such as `.list[2].email`. The engine folds them into an error
//! tree mirroring the form data, with messages under `__errors`.

use crate::error::EngineError;
use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::primitive_type::PrimitiveType;
use jsonschema::{CompilationOptions, Draft, JSONSchema};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

pub const ERRORS_KEY: &str = "__errors";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Accessor of the offending value, `""` for the form root.
    pub property: String,
    pub message: String,
}

impl FieldError {
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            property: property.into(),
            message: message.into(),
        }
    }

    pub fn stack(&self) -> String {
        format!("{} {}", self.property, self.message).trim().to_string()
    }
}

/// Validates form data against the live schema.
pub trait Validate {
    fn validate(&self, form_data: &Value, schema: &Value) -> Result<Vec<FieldError>, EngineError>;
}

/// Draft 7 validation backed by the `jsonschema` crate.
///
/// "Expected string" type errors on objects, arrays and nulls are dropped:
/// file widgets hold an object where the schema declares a string.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaValidator;

impl JsonSchemaValidator {
    fn compile(schema: &Value) -> Result<JSONSchema, EngineError> {
        let mut options = CompilationOptions::default();
        options.with_draft(Draft::Draft7);
        options
            .compile(schema)
            .map_err(|err| EngineError::Schema(err.to_string()))
    }
}

impl Validate for JsonSchemaValidator {
    fn validate(&self, form_data: &Value, schema: &Value) -> Result<Vec<FieldError>, EngineError> {
        let compiled = Self::compile(schema)?;
        let Err(errors) = compiled.validate(form_data) else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for error in errors {
            if expects_string(&error.kind) && !is_scalar(&error.instance) {
                continue;
            }
            let mut property = pointer_to_property(&error.instance_path.to_string());
            if let ValidationErrorKind::Required { property: missing } = &error.kind {
                if let Some(name) = missing.as_str() {
                    push_accessor(&mut property, name);
                }
            }
            out.push(FieldError::new(property, error.to_string()));
        }
        debug!(errors = out.len(), "form data validated");
        Ok(out)
    }
}

fn expects_string(kind: &ValidationErrorKind) -> bool {
    matches!(
        kind,
        ValidationErrorKind::Type {
            kind: TypeKind::Single(PrimitiveType::String)
        }
    )
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Array(_) | Value::Object(_))
}

fn push_accessor(property: &mut String, segment: &str) {
    if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
        property.push('[');
        property.push_str(segment);
        property.push(']');
    } else {
        property.push('.');
        property.push_str(segment);
    }
}

/// Converts a JSON pointer (`/list/2/email`) into an accessor
/// (`.list[2].email`).
pub fn pointer_to_property(pointer: &str) -> String {
    let mut out = String::new();
    for raw in pointer.split('/').skip(1) {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        push_accessor(&mut out, &segment);
    }
    out
}

/// Splits an accessor into its steps: `.a[2]['b c']` gives `a`, `2`, `b c`.
pub fn property_segments(property: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut chars = property.chars().peekable();
    let mut current = String::new();
    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                let quote = match chars.peek() {
                    Some(&q) if q == '\'' || q == '"' => {
                        chars.next();
                        Some(q)
                    }
                    _ => None,
                };
                let mut inner = String::new();
                while let Some(c) = chars.next() {
                    match quote {
                        Some(q) if c == q && chars.peek() == Some(&']') => {
                            chars.next();
                            break;
                        }
                        None if c == ']' => break,
                        _ => inner.push(c),
                    }
                }
                out.push(inner);
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Folds flat errors into a tree keyed like the form data.
///
/// ```
/// use form_engine::{to_error_schema, FieldError};
/// use serde_json::json;
///
/// let errors = vec![
///     FieldError::new(".list[1].email", "is required"),
///     FieldError::new("", "is invalid"),
/// ];
/// assert_eq!(
///     to_error_schema(&errors),
///     json!({
///         "list": {"1": {"email": {"__errors": ["is required"]}}},
///         "__errors": ["is invalid"]
///     })
/// );
/// ```
pub fn to_error_schema(errors: &[FieldError]) -> Value {
    let mut root = Value::Object(Map::new());
    for error in errors {
        insert_error(&mut root, &property_segments(&error.property), &error.message);
    }
    root
}

fn insert_error(node: &mut Value, segments: &[String], message: &str) {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    let Value::Object(map) = node else {
        return;
    };
    match segments.split_first() {
        Some((head, rest)) => {
            let child = map
                .entry(head.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            insert_error(child, rest, message);
        }
        None => {
            let messages = map
                .entry(ERRORS_KEY)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(messages) = messages {
                messages.push(Value::String(message.to_string()));
            }
        }
    }
}

/// Flattens an error tree into `"<field>: <message>"` lines, depth first.
/// Messages at the root are attributed to `root`.
pub fn to_error_list(error_schema: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect_errors(error_schema, "root", &mut out);
    out
}

fn collect_errors(node: &Value, field: &str, out: &mut Vec<String>) {
    let Value::Object(map) = node else {
        return;
    };
    if let Some(Value::Array(messages)) = map.get(ERRORS_KEY) {
        for message in messages {
            let text = message.as_str().map(str::to_string).unwrap_or_else(|| message.to_string());
            out.push(format!("{field}: {text}"));
        }
    }
    for (key, child) in map {
        if key != ERRORS_KEY {
            collect_errors(child, key, out);
        }
    }
}

/// True when `form_data` satisfies `schema`. Schemas that fail to compile
/// are treated as unsatisfiable.
pub fn is_valid(schema: &Value, form_data: &Value) -> bool {
    JsonSchemaValidator::compile(schema).is_ok_and(|compiled| compiled.is_valid(form_data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pointer_to_property() {
        assert_eq!(pointer_to_property(""), "");
        assert_eq!(pointer_to_property("/list/2/email"), ".list[2].email");
        assert_eq!(pointer_to_property("/a~1b"), ".a/b");
    }

    #[test]
    fn test_property_segments() {
        assert_eq!(property_segments(".a.b[2].c"), ["a", "b", "2", "c"]);
        assert_eq!(property_segments("['x.y'][0]"), ["x.y", "0"]);
        assert!(property_segments("").is_empty());
    }

    #[test]
    fn test_error_list() {
        let tree = to_error_schema(&[
            FieldError::new("", "top"),
            FieldError::new(".a", "first"),
            FieldError::new(".a", "second"),
            FieldError::new(".b.c", "deep"),
        ]);
        assert_eq!(
            to_error_list(&tree),
            ["root: top", "a: first", "a: second", "c: deep"]
        );
    }

    #[test]
    fn test_required_error_points_at_missing_property() {
        let schema = json!({"type": "object", "required": ["a"], "properties": {"a": {"type": "boolean"}}});
        let errors = JsonSchemaValidator.validate(&json!({}), &schema).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].property, ".a");
    }

    #[test]
    fn test_string_errors_on_objects_are_ignored() {
        let schema = json!({"type": "object", "properties": {
            "photo": {"type": "string"},
            "name": {"type": "string"}
        }});
        let data = json!({"photo": {"hash": "x"}, "name": 5});
        let errors = JsonSchemaValidator.validate(&data, &schema).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].property, ".name");
    }

    #[test]
    fn test_bad_schema() {
        let err = JsonSchemaValidator
            .validate(&json!({}), &json!({"type": 5}))
            .unwrap_err();
        assert!(matches!(err, EngineError::Schema(_)));
        assert!(!is_valid(&json!({"type": 5}), &json!({})));
        assert!(is_valid(&json!({"type": "object"}), &json!({})));
    }
}
