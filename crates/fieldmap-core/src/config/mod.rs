//! Mapping configuration model
//!
//! The raw types in this module mirror the configuration document one-to-one
//! and are produced by serde from an already-parsed tree. They are never
//! evaluated directly: [`compile`] validates them and produces the immutable
//! [`CompiledConfig`] the engine runs against.
//!
//! ```
//! use fieldmap_core::config::compile;
//! use serde_json::json;
//!
//! let tree = json!({
//!     "contexts": {"customer": {"basePath": "payload.customer"}},
//!     "mappings": [
//!         {"source": "name", "target": "fullName", "context": "customer",
//!          "transforms": [{"kind": "trim"}]}
//!     ]
//! });
//! let compiled = compile(&tree).unwrap();
//! assert_eq!(compiled.rules()[0].source().as_str(), "payload.customer.name");
//! ```
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

pub mod compiler;

pub use compiler::{
    compile, CompiledCollection, CompiledConfig, CompiledContext, CompiledItemMapping,
    CompiledRule, Contexts,
};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Top-level mapping configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingConfig {
    /// Named base paths shared by several rules
    #[serde(default, deserialize_with = "null_as_default")]
    pub contexts: BTreeMap<String, ContextDef>,
    /// Rules, evaluated in declaration order
    #[serde(default, deserialize_with = "null_as_default")]
    pub mappings: Vec<FieldMapping>,
}

/// A named base path prefix
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextDef {
    pub base_path: String,
    /// Prefix applied to the targets of member rules
    #[serde(default)]
    pub target_prefix: Option<String>,
}

/// A single mapping rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub condition: Option<ConditionDef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transforms: Vec<TransformDef>,
    /// Substituted when the source is absent
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
    #[serde(default)]
    pub collection: Option<CollectionMapping>,
}

/// Expansion of a sequence into per-item target fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMapping {
    #[serde(default)]
    pub source: String,
    /// Item cap; absent, zero or null means unlimited
    #[serde(default)]
    pub max_items: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_prefix: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_suffix: String,
    #[serde(default)]
    pub condition: Option<ConditionDef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_mappings: Vec<ItemFieldMapping>,
}

/// Mapping applied to each item of a collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFieldMapping {
    pub source: String,
    pub target: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transforms: Vec<TransformDef>,
    #[serde(default)]
    pub condition: Option<ConditionDef>,
}

/// Guard attached to a rule, collection or item mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionDef {
    pub op: String,
    #[serde(default)]
    pub left: Value,
    /// Present-but-null is `Some(Value::Null)`, distinct from a missing key
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub right: Option<Value>,
    #[serde(default)]
    pub values: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ignore_case: bool,
}

/// A transform step: `kind` plus kind-specific parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformDef {
    pub kind: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl TransformDef {
    /// Create a parameterless transform definition
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: Map::new(),
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }
}

/// An explicit `null` reads as the field's empty value
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Keep an explicit `null`; only a missing key falls back to `None`
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_full_rule() {
        let config: MappingConfig = serde_json::from_value(json!({
            "contexts": {"u": {"basePath": "user", "targetPrefix": "out"}},
            "mappings": [{
                "source": "name",
                "target": "fullName",
                "context": "u",
                "condition": {"op": "exists", "left": "$.user"},
                "transforms": [{"kind": "format", "pattern": "Dr. %s"}],
                "default": "n/a",
                "required": true
            }]
        }))
        .unwrap();

        let rule = &config.mappings[0];
        assert_eq!(config.contexts["u"].target_prefix.as_deref(), Some("out"));
        assert_eq!(rule.context.as_deref(), Some("u"));
        assert!(rule.required);
        assert_eq!(rule.default, Some(json!("n/a")));
        assert_eq!(rule.transforms[0].kind, "format");
        assert_eq!(rule.transforms[0].params["pattern"], json!("Dr. %s"));
    }

    #[test]
    fn test_deserialize_collection() {
        let rule: FieldMapping = serde_json::from_value(json!({
            "collection": {
                "source": "items",
                "maxItems": 2,
                "targetPrefix": "item_",
                "itemMappings": [{"source": "sku", "target": "code"}]
            }
        }))
        .unwrap();

        let collection = rule.collection.unwrap();
        assert_eq!(collection.max_items, Some(2));
        assert_eq!(collection.target_suffix, "");
        assert_eq!(collection.item_mappings[0].target, "code");
    }

    #[test]
    fn test_explicit_nulls_read_as_empty() {
        let config: MappingConfig = serde_yaml::from_str("contexts:\nmappings:\n").unwrap();
        assert!(config.contexts.is_empty());
        assert!(config.mappings.is_empty());

        let rule: FieldMapping = serde_json::from_value(json!({
            "source": "a",
            "target": "b",
            "transforms": null,
            "required": null,
            "collection": {
                "source": "items",
                "targetPrefix": null,
                "targetSuffix": null,
                "itemMappings": [{"source": "sku", "target": "code", "transforms": null}]
            }
        }))
        .unwrap();
        assert!(rule.transforms.is_empty());
        assert!(!rule.required);
        let collection = rule.collection.unwrap();
        assert_eq!(collection.target_prefix, "");
        assert_eq!(collection.target_suffix, "");
    }

    #[test]
    fn test_null_right_operand_is_kept() {
        let def: ConditionDef = serde_json::from_value(json!({"op": "equals", "left": "$.a", "right": null})).unwrap();
        assert_eq!(def.right, Some(Value::Null));

        let def: ConditionDef = serde_json::from_value(json!({"op": "equals", "left": "$.a"})).unwrap();
        assert_eq!(def.right, None);
    }

    #[test]
    fn test_empty_config_defaults() {
        let config: MappingConfig = serde_json::from_value(json!({})).unwrap();
        assert!(config.contexts.is_empty());
        assert!(config.mappings.is_empty());
    }
}
