//! Expansion of collection rules into per-item outcomes
//!
//! Items are visited in source order up to the cap; for each item the item
//! mappings run in declaration order. Targets follow the
//! `<targetPrefix><index><targetSuffix>.<target>` naming scheme. A
//! `required` collection rule whose source is absent or empty is an error.

use crate::condition::{evaluate_optional, ConditionOutcome};
use crate::config::{CompiledCollection, CompiledRule};
use crate::engine::{evaluate_field, MISSING_REQUIRED};
use crate::operand::Scope;
use crate::path;
use crate::report::RuleOutcome;
use serde_json::Value;
use tracing::trace;

/// Skip reason when the collection source is missing or not a sequence
pub const COLLECTION_ABSENT: &str = "collection absent";
/// Skip reason when the collection source is an empty sequence
pub const COLLECTION_EMPTY: &str = "collection empty";

/// Evaluate a collection rule against a document
pub fn expand(rule: &CompiledRule, collection: &CompiledCollection, document: &Value) -> Vec<RuleOutcome> {
    let source_path = collection.source().as_str();
    let label = collection.label();

    if let ConditionOutcome::Failed(reason) = evaluate_optional(rule.condition(), &Scope::document(document)) {
        return vec![RuleOutcome::condition_failed(source_path, label, reason)];
    }

    let items = match collection.source().resolve(document) {
        Some(Value::Array(items)) if !items.is_empty() => items,
        resolved => {
            let raw = resolved.cloned();
            let reason = match &raw {
                Some(Value::Array(_)) => COLLECTION_EMPTY,
                _ => COLLECTION_ABSENT,
            };
            trace!(source = source_path, reason, "Collection has no items");
            return vec![if rule.is_required() {
                RuleOutcome::error(source_path, label, raw, MISSING_REQUIRED)
            } else {
                RuleOutcome::skipped(source_path, label, None, reason)
            }];
        }
    };

    let limit = collection.max_items().map_or(items.len(), |cap| cap.min(items.len()));
    trace!(source = source_path, items = items.len(), limit, "Expanding collection");
    let mut outcomes = Vec::with_capacity(limit * collection.items().len());

    for (index, item) in items.iter().take(limit).enumerate() {
        let scope = Scope::item(document, item);
        let item_path = format!("{}[{}]", source_path, index);

        if let ConditionOutcome::Failed(reason) = evaluate_optional(collection.condition(), &scope) {
            outcomes.push(RuleOutcome::condition_failed(
                item_path,
                collection.item_container(index),
                reason,
            ));
            continue;
        }

        for mapping in collection.items() {
            let source = path::join(&item_path, mapping.source().as_str());
            let target_field = collection.item_target(index, mapping);

            let outcome = match evaluate_optional(mapping.condition(), &scope) {
                ConditionOutcome::Failed(reason) => RuleOutcome::condition_failed(source, target_field, reason),
                ConditionOutcome::Passed => evaluate_field(
                    &source,
                    target_field,
                    mapping.source().resolve(item),
                    None,
                    false,
                    mapping.pipeline(),
                    &scope,
                ),
            };
            outcomes.push(outcome);
        }
    }

    outcomes
}
