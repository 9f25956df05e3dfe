//! Engine configuration.

use crate::error::EngineError;
use form_expression::ParseOptions;
use form_path::DEFAULT_ROOT_MARKER;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options shared by adaptation, change passes and validation.
///
/// Deserializes from camelCase JSON; missing keys take their defaults.
///
/// ```
/// use form_engine::EngineOptions;
///
/// let options = EngineOptions::from_json(r#"{"liveValidate": true}"#).unwrap();
/// assert!(options.live_validate);
/// assert_eq!(options.root_marker, "root");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineOptions {
    /// Prefix of widget field keys, also the id of the form root.
    pub root_marker: String,
    /// Nesting limit for show/required expressions.
    pub max_expression_depth: usize,
    /// An object carrying any of these keys is replayed as one value
    /// instead of being walked.
    pub file_like_keys: Vec<String>,
    /// Validate after every committed change.
    pub live_validate: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            root_marker: DEFAULT_ROOT_MARKER.to_string(),
            max_expression_depth: ParseOptions::default().max_depth,
            file_like_keys: vec!["hash".to_string(), "size".to_string(), "type".to_string()],
            live_validate: false,
        }
    }
}

impl EngineOptions {
    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let options: EngineOptions =
            serde_json::from_str(raw).map_err(|e| EngineError::Options(e.to_string()))?;
        options.check()?;
        Ok(options)
    }

    /// Rejects values the path dialects cannot represent.
    pub fn check(&self) -> Result<(), EngineError> {
        if self.root_marker.is_empty() {
            return Err(EngineError::Options("rootMarker must not be empty".to_string()));
        }
        if self.root_marker.contains(['_', '.']) {
            return Err(EngineError::Options(format!(
                "rootMarker must not contain '_' or '.': {}",
                self.root_marker
            )));
        }
        if self.max_expression_depth == 0 {
            return Err(EngineError::Options(
                "maxExpressionDepth must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_depth: self.max_expression_depth,
        }
    }

    /// True for uploaded-file values, which are replayed whole.
    pub fn is_file_like(&self, value: &Value) -> bool {
        match value {
            Value::Object(map) => self
                .file_like_keys
                .iter()
                .any(|key| map.get(key).is_some_and(|v| !v.is_null())),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = EngineOptions::from_json("{}").unwrap();
        assert_eq!(options, EngineOptions::default());
        assert_eq!(options.max_expression_depth, 64);
    }

    #[test]
    fn test_rejects_bad_marker() {
        assert!(EngineOptions::from_json(r#"{"rootMarker": ""}"#).is_err());
        assert!(EngineOptions::from_json(r#"{"rootMarker": "my_root"}"#).is_err());
        assert!(EngineOptions::from_json(r#"{"maxExpressionDepth": 0}"#).is_err());
        assert!(EngineOptions::from_json("[]").is_err());
    }

    #[test]
    fn test_is_file_like() {
        let options = EngineOptions::default();
        assert!(options.is_file_like(&json!({"hash": "abc", "name": "a.png"})));
        assert!(!options.is_file_like(&json!({"name": "a.png"})));
        assert!(!options.is_file_like(&json!({"size": null})));
        assert!(!options.is_file_like(&json!([1])));
    }
}
