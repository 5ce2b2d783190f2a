//! Compilation of raw configuration into an immutable rule set
//!
//! Every structural problem in a configuration is detected here, before any
//! rule runs: malformed paths, unknown contexts, operators and transform kinds,
//! invalid patterns and collection limits. Errors carry the location of the
//! offending entry, e.g. `mappings[2].condition.op`.
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

use super::{CollectionMapping, ContextDef, FieldMapping, ItemFieldMapping, MappingConfig};
use crate::condition::Condition;
use crate::path::{self, PathExpr};
use crate::transform::TransformPipeline;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A context with validated paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledContext {
    pub name: String,
    pub base_path: String,
    pub target_prefix: Option<String>,
}

impl CompiledContext {
    /// Prefix a target with this context's target prefix, if any
    pub fn target(&self, target: &str) -> String {
        match &self.target_prefix {
            Some(prefix) => path::join(prefix, target),
            None => target.to_string(),
        }
    }
}

/// The named contexts of a configuration
#[derive(Debug, Clone, Default)]
pub struct Contexts {
    contexts: BTreeMap<String, CompiledContext>,
}

impl Contexts {
    /// Validate context definitions
    pub fn compile(defs: &BTreeMap<String, ContextDef>) -> Result<Self> {
        let mut contexts = BTreeMap::new();

        for (name, def) in defs {
            let location = format!("contexts.{}", name);
            check_path(&def.base_path, &format!("{}.basePath", location))?;
            if let Some(prefix) = &def.target_prefix {
                check_path(prefix, &format!("{}.targetPrefix", location))?;
            }

            contexts.insert(
                name.clone(),
                CompiledContext {
                    name: name.clone(),
                    base_path: def.base_path.clone(),
                    target_prefix: def.target_prefix.clone().filter(|p| !p.is_empty()),
                },
            );
        }

        Ok(Self { contexts })
    }

    pub fn get(&self, name: &str) -> Option<&CompiledContext> {
        self.contexts.get(name)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Split `ctx.rest` into the named context and the remaining path.
    ///
    /// Returns `None` when the first segment does not name a context.
    pub fn split_context_reference<'t>(&self, text: &'t str) -> Option<(&CompiledContext, &'t str)> {
        let end = text.find(['.', '[']).unwrap_or(text.len());
        let context = self.contexts.get(&text[..end])?;
        let rest = &text[end..];
        Some((context, rest.strip_prefix('.').unwrap_or(rest)))
    }
}

/// A collection block with validated paths and compiled item mappings
#[derive(Debug, Clone)]
pub struct CompiledCollection {
    source: PathExpr,
    max_items: Option<usize>,
    target_prefix: String,
    target_suffix: String,
    context_prefix: Option<String>,
    condition: Option<Condition>,
    items: Vec<CompiledItemMapping>,
    label: String,
}

impl CompiledCollection {
    /// Effective path of the sequence
    pub fn source(&self) -> &PathExpr {
        &self.source
    }

    /// Item cap; `None` means unlimited
    pub fn max_items(&self) -> Option<usize> {
        self.max_items
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn items(&self) -> &[CompiledItemMapping] {
        &self.items
    }

    /// Target field used for entries that concern the whole collection
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Name of the target container of item `index`: `<prefix><index><suffix>`
    pub fn item_container(&self, index: usize) -> String {
        let container = format!("{}{}{}", self.target_prefix, index, self.target_suffix);
        match &self.context_prefix {
            Some(prefix) => path::join(prefix, &container),
            None => container,
        }
    }

    /// Full target field of an item mapping for item `index`
    pub fn item_target(&self, index: usize, item: &CompiledItemMapping) -> String {
        path::join(&self.item_container(index), &item.target)
    }
}

/// A per-item mapping of a collection
#[derive(Debug, Clone)]
pub struct CompiledItemMapping {
    source: PathExpr,
    target: String,
    condition: Option<Condition>,
    pipeline: TransformPipeline,
}

impl CompiledItemMapping {
    /// Path relative to the item
    pub fn source(&self) -> &PathExpr {
        &self.source
    }

    /// Sub-field name inside the item container
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn pipeline(&self) -> &TransformPipeline {
        &self.pipeline
    }
}

/// A compiled rule
#[derive(Debug, Clone)]
pub struct CompiledRule {
    index: usize,
    source: PathExpr,
    target: String,
    condition: Option<Condition>,
    pipeline: TransformPipeline,
    default: Option<Value>,
    required: bool,
    collection: Option<CompiledCollection>,
}

impl CompiledRule {
    /// Position of the rule in `mappings`
    pub fn index(&self) -> usize {
        self.index
    }

    /// Effective source path, with the context base path applied
    pub fn source(&self) -> &PathExpr {
        &self.source
    }

    /// Effective target field, with the context target prefix applied
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn pipeline(&self) -> &TransformPipeline {
        &self.pipeline
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn collection(&self) -> Option<&CompiledCollection> {
        self.collection.as_ref()
    }
}

/// An immutable, validated configuration
#[derive(Debug, Clone, Default)]
pub struct CompiledConfig {
    contexts: Contexts,
    rules: Vec<CompiledRule>,
}

impl CompiledConfig {
    /// Compile a deserialized configuration
    pub fn from_config(config: &MappingConfig) -> Result<Self> {
        let contexts = Contexts::compile(&config.contexts)?;
        let rules = config
            .mappings
            .iter()
            .enumerate()
            .map(|(index, rule)| compile_rule(index, rule, &contexts))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { contexts, rules })
    }

    pub fn contexts(&self) -> &Contexts {
        &self.contexts
    }

    /// Rules in declaration order
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Deserialize and compile a parsed configuration tree
pub fn compile(tree: &Value) -> Result<CompiledConfig> {
    if tree.is_null() {
        return Ok(CompiledConfig::default());
    }
    let config = MappingConfig::deserialize(tree)
        .map_err(|e| Error::configuration("configuration", e.to_string()))?;
    CompiledConfig::from_config(&config)
}

fn compile_rule(index: usize, rule: &FieldMapping, contexts: &Contexts) -> Result<CompiledRule> {
    let location = format!("mappings[{}]", index);

    let context = match &rule.context {
        Some(name) => Some(contexts.get(name).ok_or_else(|| {
            Error::configuration(format!("{}.context", location), format!("unknown context '{}'", name))
        })?),
        None => None,
    };

    let condition = rule
        .condition
        .as_ref()
        .map(|c| Condition::compile(c, contexts, &format!("{}.condition", location)))
        .transpose()?;
    let pipeline = TransformPipeline::compile(&rule.transforms, contexts, &location)?;

    let collection = rule
        .collection
        .as_ref()
        .map(|c| compile_collection(c, rule, context, contexts, &format!("{}.collection", location)))
        .transpose()?;

    if collection.is_some() {
        if !rule.transforms.is_empty() {
            return Err(Error::configuration(
                format!("{}.transforms", location),
                "not supported on a collection rule, use itemMappings[].transforms",
            ));
        }
        if rule.default.is_some() {
            return Err(Error::configuration(
                format!("{}.default", location),
                "not supported on a collection rule",
            ));
        }
    } else {
        if rule.source.trim().is_empty() {
            return Err(Error::configuration(format!("{}.source", location), "source is required"));
        }
        if rule.target.trim().is_empty() {
            return Err(Error::configuration(format!("{}.target", location), "target is required"));
        }
    }

    let source = match context {
        Some(context) => path::join(&context.base_path, &rule.source),
        None => rule.source.clone(),
    };
    let source = parse_path(&source, &format!("{}.source", location))?;

    check_path(&rule.target, &format!("{}.target", location))?;
    let target = match context {
        Some(context) if !rule.target.is_empty() => context.target(&rule.target),
        _ => rule.target.clone(),
    };

    Ok(CompiledRule {
        index,
        source,
        target,
        condition,
        pipeline,
        default: rule.default.clone(),
        required: rule.required,
        collection,
    })
}

fn compile_collection(
    collection: &CollectionMapping,
    rule: &FieldMapping,
    context: Option<&CompiledContext>,
    contexts: &Contexts,
    location: &str,
) -> Result<CompiledCollection> {
    let source = match context {
        Some(context) => path::join(&context.base_path, &collection.source),
        None => collection.source.clone(),
    };
    let source = parse_path(&source, &format!("{}.source", location))?;

    let max_items = match collection.max_items {
        Some(n) if n < 0 => {
            return Err(Error::configuration(
                format!("{}.maxItems", location),
                format!("must be a non-negative integer, got {}", n),
            ))
        }
        Some(0) | None => None,
        Some(n) => Some(usize::try_from(n).map_err(|_| {
            Error::configuration(format!("{}.maxItems", location), format!("value {} is too large", n))
        })?),
    };

    if collection.item_mappings.is_empty() {
        return Err(Error::configuration(
            format!("{}.itemMappings", location),
            "a collection needs at least one item mapping",
        ));
    }

    let condition = collection
        .condition
        .as_ref()
        .map(|c| Condition::compile(c, contexts, &format!("{}.condition", location)))
        .transpose()?;

    let items = collection
        .item_mappings
        .iter()
        .enumerate()
        .map(|(i, item)| compile_item(item, contexts, &format!("{}.itemMappings[{}]", location, i)))
        .collect::<Result<Vec<_>>>()?;

    let context_prefix = context.and_then(|c| c.target_prefix.clone());
    let label = [&rule.target, &collection.target_prefix, &collection.source]
        .into_iter()
        .find(|candidate| !candidate.is_empty())
        .cloned()
        .unwrap_or_default();
    let label = match &context_prefix {
        Some(prefix) => path::join(prefix, &label),
        None => label,
    };

    Ok(CompiledCollection {
        source,
        max_items,
        target_prefix: collection.target_prefix.clone(),
        target_suffix: collection.target_suffix.clone(),
        context_prefix,
        condition,
        items,
        label,
    })
}

fn compile_item(item: &ItemFieldMapping, contexts: &Contexts, location: &str) -> Result<CompiledItemMapping> {
    let source = parse_path(&item.source, &format!("{}.source", location))?;
    if item.target.trim().is_empty() {
        return Err(Error::configuration(format!("{}.target", location), "target is required"));
    }
    check_path(&item.target, &format!("{}.target", location))?;

    let condition = item
        .condition
        .as_ref()
        .map(|c| Condition::compile(c, contexts, &format!("{}.condition", location)))
        .transpose()?;

    Ok(CompiledItemMapping {
        source,
        target: item.target.clone(),
        condition,
        pipeline: TransformPipeline::compile(&item.transforms, contexts, location)?,
    })
}

fn parse_path(raw: &str, location: &str) -> Result<PathExpr> {
    PathExpr::parse(raw).map_err(|e| Error::configuration(location, e.to_string()))
}

fn check_path(raw: &str, location: &str) -> Result<()> {
    parse_path(raw, location).map(|_| ())
}
