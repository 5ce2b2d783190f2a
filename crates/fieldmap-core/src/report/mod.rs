//! Dry-run report of a mapping pass
//!
//! The engine turns every rule evaluation into a [`RuleOutcome`] and hands it
//! to a [`ReportBuilder`], which masks sensitive values and appends one
//! [`MappingEntryReport`]. Coverage is computed once, when the builder is
//! finished.
//!
//! # Examples
//!
//! ```
//! use fieldmap_core::report::{Action, ReportBuilder, RuleOutcome};
//! use serde_json::json;
//!
//! let mut builder = ReportBuilder::new("mapping.yml", true);
//! builder.record(&RuleOutcome::set("u.email", "contact.email", Some(json!("ada@example.org")), json!("ada@example.org")));
//! builder.record(&RuleOutcome::error("u.ssn", "ssn", None, "missing required"));
//!
//! let report = builder.finish();
//! assert_eq!(report.mappings[0].transformed_value.as_deref(), Some("a***a@example.org"));
//! assert_eq!(report.mappings[1].action, Action::Error);
//! assert_eq!(report.coverage.coverage_percent, 50.0);
//! ```
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

pub mod builder;
pub mod reporting;
pub mod types;


pub use builder::ReportBuilder;
pub use reporting::{coverage_line, generate_audit_report};
pub use types::{Action, CoverageSummary, DryRunReport, MappingEntryReport, Outcome, RuleOutcome};
