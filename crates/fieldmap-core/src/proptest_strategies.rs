//! Property-based testing strategies and properties for the building blocks
//!
//! Strategies generate random documents, path strings and field values; the
//! properties below exercise the resolver, the sensitivity classifier and the
//! transform pipeline with them.

use crate::config::{Contexts, TransformDef};
use crate::operand::Scope;
use crate::path::{self, PathExpr};
use crate::sensitivity::{mask_value, Sensitivity, NULL_MASK};
use crate::transform::TransformPipeline;
use proptest::prelude::*;
use serde_json::{Map, Value};

/// Strategy for scalar leaves
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        "[a-zA-Z0-9 @._-]{0,20}".prop_map(Value::String),
    ]
}

/// Strategy for nested documents
pub fn document_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::vec(("[a-c]{1,2}", inner), 0..5)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Strategy for syntactically valid paths over the same key alphabet
pub fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof!["[a-c]{1,2}".prop_map(|k| format!(".{}", k)), (0usize..4).prop_map(|i| format!("[{}]", i))],
        0..5,
    )
    .prop_map(|segments| segments.concat().trim_start_matches('.').to_string())
}

/// Strategy for arbitrary text that may or may not be a valid path
pub fn path_text_strategy() -> impl Strategy<Value = String> {
    "[a-c.\\[\\]0-9$/x-]{0,12}"
}

/// Strategy for field names, some of them sensitive
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("email".to_string()),
        Just("ssn".to_string()),
        Just("home address".to_string()),
        Just("compass".to_string()),
        "[a-z]{1,10}",
    ]
}

proptest! {
    #[test]
    fn prop_resolution_is_total(doc in document_strategy(), text in path_text_strategy()) {
        // must not panic for any input
        let _ = path::resolve(&text, &doc);
    }

    #[test]
    fn prop_valid_paths_parse(doc in document_strategy(), raw in path_strategy()) {
        let parsed = PathExpr::parse(&raw);
        prop_assert!(parsed.is_ok(), "failed to parse {:?}", raw);
        let _ = parsed.unwrap().resolve(&doc);
    }

    #[test]
    fn prop_join_never_doubles_separators(base in "[a-c.]{0,6}", rest in "[a-c.]{0,6}") {
        let joined = path::join(&base, &rest);
        prop_assert!(!joined.contains(".."));
        prop_assert!(!joined.starts_with('.'));
        prop_assert!(!joined.ends_with('.'));
    }

    #[test]
    fn prop_mask_hides_middle(value in "[a-zA-Z0-9]{3,30}") {
        let masked = mask_value(&value, false);
        prop_assert_eq!(masked.chars().count(), 5);
        prop_assert!(masked.contains("***"));
        if value.len() > 5 {
            prop_assert_ne!(masked, value);
        }
    }

    #[test]
    fn prop_masked_values_never_leak(name in field_name_strategy(), value in scalar_strategy()) {
        let sensitivity = Sensitivity::classify(&name);
        if sensitivity.is_sensitive() {
            let masked = sensitivity.mask(Some(&value));
            match &value {
                Value::String(s) if s.chars().count() > 6 && !s.contains('@') => prop_assert_ne!(&masked, s),
                Value::Null => prop_assert_eq!(masked, NULL_MASK),
                _ => {}
            }
        }
    }

    #[test]
    fn prop_string_transforms_never_fail(value in scalar_strategy()) {
        let defs: Vec<TransformDef> = ["trim", "upper", "lower", "titleCase", "toString"]
            .into_iter()
            .map(TransformDef::new)
            .collect();
        let pipeline = TransformPipeline::compile(&defs, &Contexts::default(), "mappings[0]").unwrap();
        let doc = Value::Null;
        prop_assert!(pipeline.apply(Some(value), &Scope::document(&doc)).is_ok());
    }
}
