//! Append-only accumulation of report entries
//!
//! The builder is the only writer of report entries. Masking happens here,
//! before an entry is stored, so no clear sensitive value is ever held in a
//! report.

use super::types::{CoverageSummary, DryRunReport, MappingEntryReport, Outcome, RuleOutcome};
use crate::path::last_segment;
use crate::sensitivity::Sensitivity;
use crate::value::render;
use chrono::Utc;
use serde_json::Value;

#[derive(Debug)]
pub struct ReportBuilder {
    dry_run: bool,
    config_used: String,
    timestamp: i64,
    entries: Vec<MappingEntryReport>,
}

impl ReportBuilder {
    /// Start a report; the timestamp is taken now
    pub fn new(config_used: impl Into<String>, dry_run: bool) -> Self {
        Self {
            dry_run,
            config_used: config_used.into(),
            timestamp: Utc::now().timestamp_millis(),
            entries: Vec::new(),
        }
    }

    /// Use a fixed timestamp instead of the current time
    pub fn with_timestamp(mut self, timestamp_millis: i64) -> Self {
        self.timestamp = timestamp_millis;
        self
    }

    /// Mask and append an outcome
    pub fn record(&mut self, outcome: &RuleOutcome) -> &MappingEntryReport {
        let sensitivity = Sensitivity::classify(last_segment(&outcome.target_field));
        let is_sensitive = sensitivity.is_sensitive();

        let raw_value = match &outcome.raw_value {
            Some(raw) if is_sensitive => Some(Value::String(sensitivity.mask(Some(raw)))),
            raw => raw.clone(),
        };
        let transformed_value = match &outcome.outcome {
            Outcome::Set(value) if is_sensitive => Some(sensitivity.mask(Some(value))),
            Outcome::Set(value) => Some(render(value)),
            Outcome::Skipped(_) | Outcome::Error(_) => None,
        };

        self.entries.push(MappingEntryReport {
            source_path: outcome.source_path.clone(),
            target_field: outcome.target_field.clone(),
            raw_value,
            transformed_value,
            condition_passed: outcome.condition_passed,
            reason_if_skipped: outcome.outcome.reason().map(str::to_string),
            action: outcome.action(),
            is_sensitive,
        });

        // just pushed
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compute coverage and close the report
    pub fn finish(self) -> DryRunReport {
        let coverage = CoverageSummary::from_entries(&self.entries);
        DryRunReport {
            dry_run: self.dry_run,
            timestamp: self.timestamp,
            config_used: self.config_used,
            mappings: self.entries,
            coverage,
        }
    }
}
