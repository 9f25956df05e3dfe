//! Typed field paths for schema-driven forms.
//!
//! A form engine addresses the same node in three spellings: dotted data
//! paths (`list.0.name`), widget field keys (`root_list_0_name`) and
//! registry keys (`list_INDEX_name`) where `INDEX` stands for any array
//! position. This crate parses all of them into one [`FieldPath`] and
//! reads and writes `serde_json` documents by it.
//!
//! # Example
//!
//! ```
//! use form_path::{FieldPath, DEFAULT_ROOT_MARKER};
//! use serde_json::json;
//!
//! let changed = FieldPath::from_field_key("root_list_1_name", DEFAULT_ROOT_MARKER);
//! assert_eq!(changed.to_dotted(), "list.1.name");
//!
//! // A conditional registered for every list element...
//! let target = FieldPath::from_dotted("list.INDEX.email");
//! // ...resolved against the element that changed.
//! let resolved = target.substitute(&changed.indices());
//! assert_eq!(resolved.to_dotted(), "list.1.email");
//!
//! let mut data = json!({"list": [{}, {"name": "x"}]});
//! resolved.set(&mut data, json!("x@example.com")).unwrap();
//! assert_eq!(data["list"][1]["email"], json!("x@example.com"));
//! ```

pub mod access;
pub mod dialect;
pub mod error;
pub mod types;

pub use dialect::{
    extract_indices, parent_context, substitute_indices, to_data_path, DEFAULT_ROOT_MARKER,
};
pub use error::PathError;
pub use types::{is_valid_index, FieldPath, Segment, INDEX_TOKEN};
