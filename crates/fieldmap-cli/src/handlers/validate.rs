//! Validate command handler

use super::engine_for;
use crate::cli::{OutputFormat, ValidateArgs};
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use fieldmap_core::CompiledConfig;
use serde::Serialize;
use tracing::{info, instrument};

/// Summary of a configuration that compiled
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub config_ref: String,
    pub valid: bool,
    pub rules: usize,
    pub collections: usize,
    pub contexts: usize,
}

impl ValidationSummary {
    fn new(config_ref: &str, compiled: &CompiledConfig) -> Self {
        Self {
            config_ref: config_ref.to_string(),
            valid: true,
            rules: compiled.len(),
            collections: compiled.rules().iter().filter(|r| r.collection().is_some()).count(),
            contexts: compiled.contexts().len(),
        }
    }
}

/// Handle the validate command. A configuration that does not compile is
/// returned as the error, carrying the location of the offending node.
#[instrument(skip_all, fields(config_ref = %args.config_ref))]
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("validate_command", &args.config_ref);
    output.info(&format!("Validating mapping configuration: {}", args.config_ref))?;

    let engine = engine_for(args.base_dir.as_deref(), config);
    let compiled = engine.load_config(&args.config_ref)?;
    let summary = ValidationSummary::new(&args.config_ref, &compiled);
    info!(rules = summary.rules, collections = summary.collections, "Configuration is valid");

    if output.format() == OutputFormat::Human {
        output.success(&format!(
            "✓ Configuration is valid: {} rule(s), {} collection(s), {} context(s)",
            summary.rules, summary.collections, summary.contexts
        ))
    } else {
        output.data(&summary)
    }
}
