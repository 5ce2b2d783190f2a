//! Core types for the dry-run report
//!
//! This module defines the serialized report shape and the unmasked per-rule
//! outcomes the engine hands to the report builder.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// What happened to a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// Value produced (and written unless dry-run)
    Set,
    /// Condition failed or nothing to map
    Skipped,
    /// Per-rule failure; counts as skipped
    Error,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Set => "SET",
            Self::Skipped => "SKIPPED",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One report entry per rule evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntryReport {
    pub source_path: String,
    pub target_field: String,
    /// Resolved source value; a masked string for sensitive fields
    pub raw_value: Option<Value>,
    /// Rendered result; masked for sensitive fields
    pub transformed_value: Option<String>,
    pub condition_passed: bool,
    pub reason_if_skipped: Option<String>,
    pub action: Action,
    pub is_sensitive: bool,
}

/// Applied/skipped counts over all entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub total_mappings: usize,
    pub applied: usize,
    pub skipped: usize,
    pub coverage_percent: f64,
}

impl CoverageSummary {
    /// Summarize entries; the percentage is rounded to one decimal
    pub fn from_entries(entries: &[MappingEntryReport]) -> Self {
        let total_mappings = entries.len();
        let applied = entries.iter().filter(|e| e.action == Action::Set).count();
        let coverage_percent = if total_mappings == 0 {
            0.0
        } else {
            (applied as f64 / total_mappings as f64 * 1000.0).round() / 10.0
        };

        Self {
            total_mappings,
            applied,
            skipped: total_mappings - applied,
            coverage_percent,
        }
    }
}

/// The dry-run report of one mapping pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunReport {
    pub dry_run: bool,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub config_used: String,
    pub mappings: Vec<MappingEntryReport>,
    pub coverage: CoverageSummary,
}

impl DryRunReport {
    /// Report time as a UTC date
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    /// Entries with the given action
    pub fn entries_with(&self, action: Action) -> impl Iterator<Item = &MappingEntryReport> {
        self.mappings.iter().filter(move |e| e.action == action)
    }

    /// Entry for a target field, if any
    pub fn entry(&self, target_field: &str) -> Option<&MappingEntryReport> {
        self.mappings.iter().find(|e| e.target_field == target_field)
    }

    pub fn has_errors(&self) -> bool {
        self.entries_with(Action::Error).next().is_some()
    }

    /// Human-readable audit text
    pub fn audit_report(&self) -> String {
        super::reporting::generate_audit_report(self)
    }
}

/// Unmasked result of a rule, or of one collection item mapping
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Set(Value),
    Skipped(String),
    Error(String),
}

impl Outcome {
    pub fn action(&self) -> Action {
        match self {
            Self::Set(_) => Action::Set,
            Self::Skipped(_) => Action::Skipped,
            Self::Error(_) => Action::Error,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Set(_) => None,
            Self::Skipped(reason) | Self::Error(reason) => Some(reason),
        }
    }
}

/// Everything the report builder needs to record one entry
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub source_path: String,
    pub target_field: String,
    pub raw_value: Option<Value>,
    pub condition_passed: bool,
    pub outcome: Outcome,
}

impl RuleOutcome {
    pub fn set(
        source_path: impl Into<String>,
        target_field: impl Into<String>,
        raw_value: Option<Value>,
        value: Value,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            target_field: target_field.into(),
            raw_value,
            condition_passed: true,
            outcome: Outcome::Set(value),
        }
    }

    /// A skip caused by a failed condition
    pub fn condition_failed(
        source_path: impl Into<String>,
        target_field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            target_field: target_field.into(),
            raw_value: None,
            condition_passed: false,
            outcome: Outcome::Skipped(reason.into()),
        }
    }

    /// A skip with a passing condition, e.g. an absent source
    pub fn skipped(
        source_path: impl Into<String>,
        target_field: impl Into<String>,
        raw_value: Option<Value>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            target_field: target_field.into(),
            raw_value,
            condition_passed: true,
            outcome: Outcome::Skipped(reason.into()),
        }
    }

    pub fn error(
        source_path: impl Into<String>,
        target_field: impl Into<String>,
        raw_value: Option<Value>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            target_field: target_field.into(),
            raw_value,
            condition_passed: true,
            outcome: Outcome::Error(reason.into()),
        }
    }

    pub fn action(&self) -> Action {
        self.outcome.action()
    }
}
