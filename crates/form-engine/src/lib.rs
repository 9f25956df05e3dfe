//! Schema-driven form engine.
//!
//! A [`FieldDocument`] describing a data model is adapted once into a JSON
//! render schema, a UI schema and two registries of conditional rules.
//! A [`FormState`] then keeps schema and data in step as fields change:
//! every edit evaluates each `show` rule (inserting or removing optional
//! fields) and each `required` rule (editing `required` lists), and commits
//! the result atomically.
//!
//! # Example
//!
//! ```
//! use form_engine::{adapt, EngineOptions, FieldDocument, FormState};
//! use serde_json::json;
//!
//! let doc = FieldDocument::from_value(json!({"fields": {
//!     "a": {"type": "Boolean", "required": true},
//!     "b": {"type": "String", "show": "data.a === true"}
//! }})).unwrap();
//! let options = EngineOptions::default();
//! let mut form = FormState::new(adapt(&doc, &options), None, options).unwrap();
//!
//! form.on_field_change("root_a", json!(true)).unwrap();
//! assert!(form.is_shown("b"));
//!
//! form.on_field_change("root_b", json!("hello")).unwrap();
//! form.on_field_change("root_a", json!(false)).unwrap();
//! assert!(!form.is_shown("b"));
//! assert_eq!(form.form_data(), &json!({"a": false}));
//! ```

pub mod action;
pub mod adapter;
pub mod config;
pub mod context;
pub mod defaults;
pub mod definition;
pub mod error;
pub mod form;
pub mod ids;
pub mod required;
pub mod show;
pub mod type_mapping;
pub mod validate;

pub use action::{global_action, set_global_action, ActionSource, GlobalAction, StaticAction};
pub use adapter::{
    adapt, AdaptedSchema, ConditionalField, ConditionalFieldRegistry, ConditionalRequiredRegistry,
    ConditionalRequirement,
};
pub use config::EngineOptions;
pub use context::{build_context, ChangeContext, SchemaMutation, TrackedSchema};
pub use defaults::{default_form_state, merge_objects};
pub use definition::{Condition, FieldDefinition, FieldDocument};
pub use error::EngineError;
pub use form::{FormState, PassReport, RenderSnapshot};
pub use ids::to_id_schema;
pub use required::{evaluate_required, RequiredOutcome};
pub use show::{evaluate_show, ShowOutcome, SkipReason};
pub use validate::{to_error_list, to_error_schema, FieldError, JsonSchemaValidator, Validate};
