//! Tests for the transform system
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

use super::{TransformError, TransformKind, TransformPipeline};
use crate::config::{ContextDef, Contexts, TransformDef};
use crate::operand::Scope;
use serde_json::{json, Value};
use std::collections::BTreeMap;

fn pipeline(defs: Vec<TransformDef>) -> TransformPipeline {
    TransformPipeline::compile(&defs, &Contexts::default(), "mappings[0]").unwrap()
}

fn run(defs: Vec<TransformDef>, input: Option<Value>) -> Result<Option<Value>, TransformError> {
    let doc = json!({});
    pipeline(defs).apply(input, &Scope::document(&doc))
}

fn one(kind: &str, input: Value) -> Result<Option<Value>, TransformError> {
    run(vec![TransformDef::new(kind)], Some(input))
}

#[test]
fn test_empty_pipeline_is_identity() {
    let p = pipeline(vec![]);
    assert!(p.is_empty());
    let doc = json!({});
    assert_eq!(p.apply(Some(json!(1)), &Scope::document(&doc)).unwrap(), Some(json!(1)));
    assert_eq!(p.apply(None, &Scope::document(&doc)).unwrap(), None);
}

#[test]
fn test_string_transforms() {
    assert_eq!(one("trim", json!("  Ada  ")).unwrap(), Some(json!("Ada")));
    assert_eq!(one("upper", json!("ada")).unwrap(), Some(json!("ADA")));
    assert_eq!(one("lower", json!("ADA")).unwrap(), Some(json!("ada")));
    assert_eq!(
        one("titleCase", json!("the  QUICK fox")).unwrap(),
        Some(json!("The  Quick Fox"))
    );
}

#[test]
fn test_string_transforms_leave_other_types_alone() {
    assert_eq!(one("trim", json!(42)).unwrap(), Some(json!(42)));
    assert_eq!(one("upper", json!(null)).unwrap(), Some(json!(null)));
}

#[test]
fn test_absent_input_passes_through() {
    assert_eq!(run(vec![TransformDef::new("toInt")], None).unwrap(), None);
    assert_eq!(run(vec![TransformDef::new("trim")], None).unwrap(), None);
}

#[test]
fn test_to_int() {
    assert_eq!(one("toInt", json!(7)).unwrap(), Some(json!(7)));
    assert_eq!(one("toInt", json!(7.9)).unwrap(), Some(json!(7)));
    assert_eq!(one("toInt", json!(-7.9)).unwrap(), Some(json!(-7)));
    assert_eq!(one("toInt", json!(" 42 ")).unwrap(), Some(json!(42)));
    assert_eq!(one("toInt", json!("3.5")).unwrap(), Some(json!(3)));
    assert_eq!(one("toInt", json!(true)).unwrap(), Some(json!(1)));

    let err = one("toInt", json!("abc")).unwrap_err();
    assert_eq!(err.kind(), TransformKind::ToInt);
    assert!(err.to_string().starts_with("toInt: cannot convert 'abc'"));
    assert!(one("toInt", json!(null)).is_err());
    assert!(one("toInt", json!([1])).is_err());
}

#[test]
fn test_to_number() {
    assert_eq!(one("toNumber", json!("12")).unwrap(), Some(json!(12)));
    assert_eq!(one("toNumber", json!("1.25")).unwrap(), Some(json!(1.25)));
    assert_eq!(one("toNumber", json!(2.5)).unwrap(), Some(json!(2.5)));
    assert!(one("toNumber", json!(true)).is_err());
    assert!(one("toNumber", json!("twelve")).is_err());
}

#[test]
fn test_to_bool() {
    assert_eq!(one("toBool", json!("YES")).unwrap(), Some(json!(true)));
    assert_eq!(one("toBool", json!("off")).unwrap(), Some(json!(false)));
    assert_eq!(one("toBool", json!(1)).unwrap(), Some(json!(true)));
    assert_eq!(one("toBool", json!(0)).unwrap(), Some(json!(false)));
    assert_eq!(one("toBool", json!(false)).unwrap(), Some(json!(false)));
    assert!(one("toBool", json!(2)).is_err());
    assert!(one("toBool", json!("maybe")).is_err());
}

#[test]
fn test_to_string() {
    assert_eq!(one("toString", json!(3)).unwrap(), Some(json!("3")));
    assert_eq!(one("toString", json!({"a": 1})).unwrap(), Some(json!("{\"a\":1}")));
}

#[test]
fn test_format() {
    let fmt = |pattern: &str, input: Value| {
        run(
            vec![TransformDef::new("format").with_param("pattern", json!(pattern))],
            Some(input),
        )
    };
    assert_eq!(fmt("ID-%s", json!(12)).unwrap(), Some(json!("ID-12")));
    assert_eq!(fmt("%d items", json!("4")).unwrap(), Some(json!("4 items")));
    assert_eq!(fmt("%d items", json!(4.0)).unwrap(), Some(json!("4 items")));
    assert_eq!(fmt("%.2f EUR", json!(3)).unwrap(), Some(json!("3.00 EUR")));
    assert_eq!(fmt("%d%%", json!(50)).unwrap(), Some(json!("50%")));

    let err = fmt("%d", json!("n/a")).unwrap_err();
    assert!(err.to_string().starts_with("format:"));
}

#[test]
fn test_format_flags_and_width() {
    let fmt = |pattern: &str, input: Value| {
        run(
            vec![TransformDef::new("format").with_param("pattern", json!(pattern))],
            Some(input),
        )
    };
    assert_eq!(fmt("%05d", json!(42)).unwrap(), Some(json!("00042")));
    assert_eq!(fmt("%-8s|", json!("ab")).unwrap(), Some(json!("ab      |")));
    assert_eq!(fmt("%8.2f", json!(3.14159)).unwrap(), Some(json!("    3.14")));
    assert_eq!(fmt("%,d", json!("1234567")).unwrap(), Some(json!("1,234,567")));
    assert_eq!(fmt("%+d", json!(7)).unwrap(), Some(json!("+7")));
}

#[test]
fn test_format_integer_rejects_fractions() {
    let fmt = |input: Value| {
        run(
            vec![TransformDef::new("format").with_param("pattern", json!("%d items"))],
            Some(input),
        )
    };
    let err = fmt(json!("4.8")).unwrap_err();
    assert_eq!(err.to_string(), "format: cannot convert '4.8' to integer");
    assert!(fmt(json!(4.8)).is_err());
    assert!(fmt(json!(1e300)).is_err());
}

#[test]
fn test_replace_literal_and_regex() {
    let literal = TransformDef::new("replace")
        .with_param("from", json!("-"))
        .with_param("to", json!(""));
    assert_eq!(run(vec![literal], Some(json!("12-34-56"))).unwrap(), Some(json!("123456")));

    let regex = TransformDef::new("replace")
        .with_param("from", json!("\\s+"))
        .with_param("to", json!(" "))
        .with_param("regex", json!(true));
    assert_eq!(run(vec![regex], Some(json!("a   b \t c"))).unwrap(), Some(json!("a b c")));

    // "to" defaults to empty
    let strip = TransformDef::new("replace").with_param("from", json!("x"));
    assert_eq!(run(vec![strip], Some(json!("xaxbx"))).unwrap(), Some(json!("ab")));
}

#[test]
fn test_map_lookup() {
    let table = json!({"M": "male", "F": "female"});
    let lenient = TransformDef::new("mapLookup").with_param("table", table.clone());
    assert_eq!(run(vec![lenient.clone()], Some(json!("F"))).unwrap(), Some(json!("female")));
    assert_eq!(run(vec![lenient], Some(json!("X"))).unwrap(), Some(json!("X")));

    let strict = TransformDef::new("mapLookup")
        .with_param("table", table)
        .with_param("strict", json!(true));
    let err = run(vec![strict], Some(json!("X"))).unwrap_err();
    assert_eq!(err.to_string(), "mapLookup: no entry for 'X'");
}

#[test]
fn test_default_only_fills_absent() {
    let def = TransformDef::new("default").with_param("value", json!("n/a"));
    assert_eq!(run(vec![def.clone()], None).unwrap(), Some(json!("n/a")));
    assert_eq!(run(vec![def.clone()], Some(json!(null))).unwrap(), Some(json!(null)));
    assert_eq!(run(vec![def], Some(json!("x"))).unwrap(), Some(json!("x")));
}

#[test]
fn test_concat_resolves_paths_in_scope() {
    let mut defs = BTreeMap::new();
    defs.insert(
        "addr".to_string(),
        ContextDef {
            base_path: "customer.address".to_string(),
            target_prefix: None,
        },
    );
    let contexts = Contexts::compile(&defs).unwrap();
    let concat = TransformDef::new("concat")
        .with_param("parts", json!(["$.first", "$.missing", "addr.city", 7]))
        .with_param("separator", json!("|"));
    let p = TransformPipeline::compile(&[concat], &contexts, "mappings[0]").unwrap();

    let doc = json!({"customer": {"address": {"city": "Oslo"}}});
    let item = json!({"first": "Ada"});
    let out = p.apply(None, &Scope::item(&doc, &item)).unwrap();
    assert_eq!(out, Some(json!("Ada||Oslo|7")));
}

#[test]
fn test_first_failure_stops_pipeline() {
    let defs = vec![
        TransformDef::new("toInt"),
        TransformDef::new("default").with_param("value", json!(0)),
    ];
    assert!(run(defs, Some(json!("abc"))).is_err());
}

#[test]
fn test_compile_errors_are_located() {
    let compile = |def: TransformDef| {
        TransformPipeline::compile(&[TransformDef::new("trim"), def], &Contexts::default(), "mappings[3]")
            .unwrap_err()
            .to_string()
    };

    let err = compile(TransformDef::new("reverse"));
    assert!(err.contains("mappings[3].transforms[1].kind"));
    assert!(err.contains("reverse"));

    assert!(compile(TransformDef::new("format")).contains("transforms[1].pattern"));
    assert!(compile(TransformDef::new("format").with_param("pattern", json!("%s %s"))).contains("pattern"));
    assert!(compile(TransformDef::new("replace")).contains("transforms[1].from"));
    assert!(compile(
        TransformDef::new("replace")
            .with_param("from", json!("("))
            .with_param("regex", json!(true))
    )
    .contains("invalid regex"));
    assert!(compile(TransformDef::new("concat")).contains("parts"));
    assert!(compile(TransformDef::new("mapLookup")).contains("table"));
    assert!(compile(TransformDef::new("default")).contains("value"));
}
