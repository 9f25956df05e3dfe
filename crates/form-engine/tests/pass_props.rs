use form_engine::{adapt, EngineOptions, FieldDocument, FormState, StaticAction};
use proptest::prelude::*;
use serde_json::json;

fn form() -> FormState {
    let doc = FieldDocument::from_value(json!({"fields": {
        "a": {"type": "Number"},
        "b": {"type": "String", "show": "data.a > 0"},
        "c": {"type": "String", "required": "row.a > 5"}
    }}))
    .unwrap();
    let options = EngineOptions::default();
    FormState::new(adapt(&doc, &options), None, options)
        .unwrap()
        .with_action_source(StaticAction(json!(null)))
}

proptest! {
    #[test]
    fn state_depends_only_on_the_last_value(values in prop::collection::vec(-10i64..10, 1..12)) {
        let mut form = form();
        for value in &values {
            form.on_field_change("root_a", json!(value)).unwrap();
        }
        let last = values[values.len() - 1];
        prop_assert_eq!(form.is_shown("b"), last > 0);

        let required = form.schema()["required"].as_array().unwrap().clone();
        let count = required.iter().filter(|name| *name == "c").count();
        prop_assert_eq!(count, usize::from(last > 5));
    }
}
