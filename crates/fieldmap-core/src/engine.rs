//! The mapping engine
//!
//! Drives one mapping pass: compile the configuration, evaluate every rule in
//! declaration order, record each outcome in the report and, unless in dry-run
//! mode, write produced values into the target document.
//!
//! ```
//! use fieldmap_core::{InMemoryLoader, MapOptions, MappingEngine, MappingOutput};
//! use serde_json::json;
//!
//! let loader = InMemoryLoader::new()
//!     .with("config", json!({"mappings": [{"source": "user.name", "target": "fullName",
//!                                          "transforms": [{"kind": "trim"}]}]}))
//!     .with("data", json!({"user": {"name": "  Ada  "}}));
//! let engine = MappingEngine::new(loader);
//!
//! let options = MapOptions::default().dry_run(false);
//! let MappingOutput::Target(target) = engine.map_data("config", "data", options).unwrap() else {
//!     panic!("expected the target document");
//! };
//! assert_eq!(target.get("fullName"), Some(&json!("Ada")));
//! ```
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

use crate::collection;
use crate::condition::{evaluate_optional, ConditionOutcome};
use crate::config::{compile, CompiledConfig, CompiledRule};
use crate::loader::{FileResourceLoader, ResourceLoader};
use crate::operand::Scope;
use crate::report::{Action, DryRunReport, Outcome, ReportBuilder, RuleOutcome};
use crate::target::TargetDocument;
use crate::transform::TransformPipeline;
use crate::Result;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, info_span, warn};

/// Reason recorded when a required rule has no value
pub const MISSING_REQUIRED: &str = "missing required";
/// Reason recorded when an optional rule has no value
pub const SOURCE_ABSENT: &str = "source absent";

/// Toggles of one mapping pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapOptions {
    /// Suppress target writes
    pub dry_run: bool,
    /// Return the report instead of the target document
    pub json_dry_run_output: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            json_dry_run_output: false,
        }
    }
}

impl MapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn json_dry_run_output(mut self, json_dry_run_output: bool) -> Self {
        self.json_dry_run_output = json_dry_run_output;
        self
    }
}

/// Payload returned by [`MappingEngine::map_data`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MappingOutput {
    Report(DryRunReport),
    Target(TargetDocument),
}

impl MappingOutput {
    pub fn as_report(&self) -> Option<&DryRunReport> {
        match self {
            Self::Report(report) => Some(report),
            Self::Target(_) => None,
        }
    }

    pub fn as_target(&self) -> Option<&TargetDocument> {
        match self {
            Self::Target(target) => Some(target),
            Self::Report(_) => None,
        }
    }
}

/// Report and target document of a finished pass
#[derive(Debug, Clone)]
pub struct MappingRun {
    pub report: DryRunReport,
    pub target: TargetDocument,
}

impl MappingRun {
    /// Select the payload requested by the options
    pub fn into_output(self, options: MapOptions) -> MappingOutput {
        if options.json_dry_run_output {
            MappingOutput::Report(self.report)
        } else {
            MappingOutput::Target(self.target)
        }
    }
}

/// Runs mapping passes over documents obtained from a loader
#[derive(Debug, Clone, Default)]
pub struct MappingEngine<L = FileResourceLoader> {
    loader: L,
}

impl<L: ResourceLoader> MappingEngine<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Load and compile a configuration without running it
    pub fn load_config(&self, config_ref: &str) -> Result<CompiledConfig> {
        compile(&self.loader.load(config_ref)?)
    }

    /// Run one mapping pass and return the payload selected by `options`.
    ///
    /// The configuration is compiled before the data is loaded, so an invalid
    /// configuration is reported even when the data reference is bad too.
    pub fn map_data(&self, config_ref: &str, data_ref: &str, options: MapOptions) -> Result<MappingOutput> {
        let compiled = self.load_config(config_ref)?;
        let document = self.loader.load(data_ref)?;
        Ok(run(&compiled, &document, config_ref, options).into_output(options))
    }
}

impl MappingEngine {
    /// Map already-parsed trees without a loader
    pub fn map_values(
        config_tree: &Value,
        document: &Value,
        config_ref: &str,
        options: MapOptions,
    ) -> Result<MappingOutput> {
        let compiled = compile(config_tree)?;
        Ok(run(&compiled, document, config_ref, options).into_output(options))
    }
}

/// Evaluate every rule of a compiled configuration against a document
pub fn run(compiled: &CompiledConfig, document: &Value, config_ref: &str, options: MapOptions) -> MappingRun {
    let span = info_span!("map_data", config = %config_ref, dry_run = options.dry_run);
    let _enter = span.enter();
    info!(rules = compiled.len(), "Starting mapping pass");

    let mut builder = ReportBuilder::new(config_ref, options.dry_run);
    let mut target = TargetDocument::new();

    for rule in compiled.rules() {
        let outcomes = match rule.collection() {
            Some(collection) => collection::expand(rule, collection, document),
            None => vec![evaluate_rule(rule, document)],
        };

        for outcome in outcomes {
            record(&mut builder, &mut target, outcome, rule.index(), options.dry_run);
        }
    }

    let report = builder.finish();
    info!(
        entries = report.coverage.total_mappings,
        applied = report.coverage.applied,
        skipped = report.coverage.skipped,
        coverage = report.coverage.coverage_percent,
        written = target.len(),
        "Mapping pass complete"
    );

    MappingRun { report, target }
}

fn record(builder: &mut ReportBuilder, target: &mut TargetDocument, outcome: RuleOutcome, rule: usize, dry_run: bool) {
    // Log the masked entry only
    let entry = builder.record(&outcome);
    match entry.action {
        Action::Error => warn!(
            rule,
            target = %entry.target_field,
            reason = entry.reason_if_skipped.as_deref().unwrap_or_default(),
            "Mapping rule failed"
        ),
        Action::Skipped => debug!(
            rule,
            target = %entry.target_field,
            reason = entry.reason_if_skipped.as_deref().unwrap_or_default(),
            "Mapping rule skipped"
        ),
        Action::Set => debug!(
            rule,
            target = %entry.target_field,
            value = entry.transformed_value.as_deref().unwrap_or_default(),
            "Mapping rule applied"
        ),
    }

    if let (false, Outcome::Set(value)) = (dry_run, outcome.outcome) {
        target.insert(outcome.target_field, value);
    }
}

/// Evaluate a scalar rule
fn evaluate_rule(rule: &CompiledRule, document: &Value) -> RuleOutcome {
    let scope = Scope::document(document);
    let source_path = rule.source().as_str();

    if let ConditionOutcome::Failed(reason) = evaluate_optional(rule.condition(), &scope) {
        return RuleOutcome::condition_failed(source_path, rule.target(), reason);
    }

    evaluate_field(
        source_path,
        rule.target().to_string(),
        rule.source().resolve(document),
        rule.default(),
        rule.is_required(),
        rule.pipeline(),
        &scope,
    )
}

/// Resolve, default and transform one field whose condition already passed
pub(crate) fn evaluate_field(
    source_path: &str,
    target_field: String,
    raw: Option<&Value>,
    default: Option<&Value>,
    required: bool,
    pipeline: &TransformPipeline,
    scope: &Scope<'_>,
) -> RuleOutcome {
    let raw_value = raw.cloned();
    let input = raw_value.clone().or_else(|| default.cloned());

    if input.is_none() && required {
        return RuleOutcome::error(source_path, target_field, None, MISSING_REQUIRED);
    }

    match pipeline.apply(input, scope) {
        Ok(Some(value)) => RuleOutcome::set(source_path, target_field, raw_value, value),
        Ok(None) => RuleOutcome::skipped(source_path, target_field, raw_value, SOURCE_ABSENT),
        Err(e) => RuleOutcome::error(source_path, target_field, raw_value, e.to_string()),
    }
}
