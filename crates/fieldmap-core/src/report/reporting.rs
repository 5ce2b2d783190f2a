//! Human-readable rendering of dry-run reports

use super::types::{CoverageSummary, DryRunReport};
use crate::value::render;

/// One-line coverage summary, e.g. `Coverage: 2/3 applied, 1 skipped (66.7%)`
pub fn coverage_line(coverage: &CoverageSummary) -> String {
    format!(
        "Coverage: {}/{} applied, {} skipped ({:.1}%)",
        coverage.applied, coverage.total_mappings, coverage.skipped, coverage.coverage_percent
    )
}

/// Generate the audit text of a report
pub fn generate_audit_report(report: &DryRunReport) -> String {
    let mut out = String::new();

    out.push_str("=== Mapping Audit Report ===\n\n");
    out.push_str(&format!("Config: {}\n", report.config_used));
    out.push_str(&format!("Dry Run: {}\n", report.dry_run));
    if let Some(at) = report.timestamp_utc() {
        out.push_str(&format!("Timestamp: {}\n", at.to_rfc3339()));
    }
    out.push('\n');

    out.push_str(&format!("--- Mappings ({}) ---\n", report.mappings.len()));
    for entry in &report.mappings {
        out.push_str(&format!(
            "  {:<9} {} -> {}{}\n",
            format!("[{}]", entry.action),
            display_or_dash(&entry.source_path),
            entry.target_field,
            if entry.is_sensitive { " (sensitive)" } else { "" }
        ));

        let raw = entry.raw_value.as_ref().map(render);
        match (&raw, &entry.transformed_value) {
            (Some(raw), Some(value)) if raw != value => {
                out.push_str(&format!("    Value: {} => {}\n", raw, value));
            }
            (_, Some(value)) => out.push_str(&format!("    Value: {}\n", value)),
            (Some(raw), None) => out.push_str(&format!("    Raw: {}\n", raw)),
            (None, None) => {}
        }
        if let Some(reason) = &entry.reason_if_skipped {
            out.push_str(&format!("    Reason: {}\n", reason));
        }
    }
    out.push('\n');

    out.push_str(&coverage_line(&report.coverage));
    out.push('\n');
    out
}

fn display_or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}
