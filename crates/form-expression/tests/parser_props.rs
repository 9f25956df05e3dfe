use form_expression::{Bindings, CompiledExpression, JsValue, ParseOptions};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn arbitrary_sources_never_panic(source in "[ -~]{0,40}") {
        let expr = CompiledExpression::compile(&source, &ParseOptions::default());
        let bindings = Bindings::form(JsValue::Undefined, json!({}).into(), JsValue::Undefined);
        let _ = expr.evaluate(&bindings);
    }

    #[test]
    fn integer_comparison_matches_rust(a in -1000i64..1000, b in -1000i64..1000) {
        let expr = CompiledExpression::compile("row.a < row.b", &ParseOptions::default());
        let bindings = Bindings::form(JsValue::Undefined, json!({"a": a, "b": b}).into(), JsValue::Undefined);
        prop_assert_eq!(expr.test(&bindings), Ok(a < b));
    }

    #[test]
    fn nesting_beyond_the_limit_is_rejected(depth in 5usize..40) {
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let shallow = ParseOptions { max_depth: 4 };
        prop_assert!(!CompiledExpression::compile(&source, &shallow).is_valid());
        prop_assert!(CompiledExpression::compile(&source, &ParseOptions::default()).is_valid());
    }

    #[test]
    fn long_operator_chains_fail_cleanly(links in 64usize..5000, op in prop::sample::select(vec!["+", "*", "&&", "===", "<"])) {
        let source = format!("1{}", format!(" {op} 1").repeat(links));
        let expr = CompiledExpression::compile(&source, &ParseOptions::default());
        prop_assert!(!expr.is_valid());
        let bindings = Bindings::form(JsValue::Undefined, json!({}).into(), JsValue::Undefined);
        prop_assert!(expr.test(&bindings).is_err());
    }
}
