//! Conversions between the three external path dialects.
//!
//! - dotted form-data path: `a.0.b`
//! - field key, as emitted by widgets: `root_a_0_b`
//! - registry key, as used by the conditional registries: `a_INDEX_b`
//!
//! Field and registry keys join segments with `_`, so property names that
//! themselves contain `_` cannot be told apart from nesting.

use crate::types::{FieldPath, Segment};

/// Marker prefixing every field key.
pub const DEFAULT_ROOT_MARKER: &str = "root";

pub const DATA_SEPARATOR: char = '.';
pub const KEY_SEPARATOR: char = '_';

fn split_segments(raw: &str, separator: char) -> FieldPath {
    if raw.is_empty() {
        return FieldPath::root();
    }
    raw.split(separator).map(Segment::parse).collect()
}

fn join_segments(path: &FieldPath, separator: char) -> String {
    let mut out = String::new();
    for (i, segment) in path.segments().iter().enumerate() {
        if i > 0 {
            out.push(separator);
        }
        out.push_str(&segment.to_string());
    }
    out
}

impl FieldPath {
    /// Parses a dotted path. The empty string is the root.
    ///
    /// ```
    /// use form_path::{FieldPath, Segment};
    ///
    /// let path = FieldPath::from_dotted("items.INDEX.name");
    /// assert_eq!(
    ///     path.segments(),
    ///     &[Segment::key("items"), Segment::Placeholder, Segment::key("name")]
    /// );
    /// assert!(FieldPath::from_dotted("").is_root());
    /// ```
    pub fn from_dotted(raw: &str) -> FieldPath {
        split_segments(raw, DATA_SEPARATOR)
    }

    pub fn to_dotted(&self) -> String {
        join_segments(self, DATA_SEPARATOR)
    }

    /// Parses a widget field key such as `root_a_0_b`.
    ///
    /// The key equal to `root_marker` is the document root.
    pub fn from_field_key(key: &str, root_marker: &str) -> FieldPath {
        if key == root_marker {
            return FieldPath::root();
        }
        let rest = key
            .strip_prefix(root_marker)
            .and_then(|rest| rest.strip_prefix(KEY_SEPARATOR))
            .unwrap_or(key);
        split_segments(rest, KEY_SEPARATOR)
    }

    pub fn to_field_key(&self, root_marker: &str) -> String {
        if self.is_root() {
            return root_marker.to_string();
        }
        let mut out = String::from(root_marker);
        out.push(KEY_SEPARATOR);
        out.push_str(&join_segments(self, KEY_SEPARATOR));
        out
    }

    /// Parses an underscore-joined registry key such as `list_INDEX_name`.
    pub fn from_registry_key(key: &str) -> FieldPath {
        split_segments(key, KEY_SEPARATOR)
    }

    /// Renders the registry key, with concrete indices rendered as `INDEX`.
    ///
    /// ```
    /// use form_path::FieldPath;
    ///
    /// let path = FieldPath::from_dotted("list.items.0.properties.name");
    /// assert_eq!(path.to_registry_key(), "list_items_INDEX_properties_name");
    /// ```
    pub fn to_registry_key(&self) -> String {
        join_segments(&self.abstract_indices(), KEY_SEPARATOR)
    }
}

/// Canonical dotted data path of a widget field key.
///
/// ```
/// use form_path::to_data_path;
///
/// assert_eq!(to_data_path("root_a_0_b"), "a.0.b");
/// assert_eq!(to_data_path("root"), "");
/// ```
pub fn to_data_path(field_key: &str) -> String {
    FieldPath::from_field_key(field_key, DEFAULT_ROOT_MARKER).to_dotted()
}

/// Dotted path of the enclosing container; `""` denotes the document root.
///
/// ```
/// use form_path::parent_context;
///
/// assert_eq!(parent_context("a.0.b"), "a.0");
/// assert_eq!(parent_context("a"), "");
/// ```
pub fn parent_context(data_path: &str) -> String {
    FieldPath::from_dotted(data_path).parent_context().to_dotted()
}

/// Integer steps of a dotted path, left to right.
pub fn extract_indices(path: &str) -> Vec<usize> {
    FieldPath::from_dotted(path).indices()
}

/// Replaces `INDEX` tokens of a dotted path, one at a time, in encounter order.
///
/// ```
/// use form_path::substitute_indices;
///
/// assert_eq!(substitute_indices("a.INDEX.b.INDEX.c", &[2, 5]), "a.2.b.5.c");
/// assert_eq!(substitute_indices("a.INDEX.b.INDEX.c", &[2]), "a.2.b.INDEX.c");
/// ```
pub fn substitute_indices(path_with_placeholders: &str, indices: &[usize]) -> String {
    FieldPath::from_dotted(path_with_placeholders)
        .substitute(indices)
        .to_dotted()
}
