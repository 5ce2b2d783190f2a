//! Output formatting and writing utilities
//!
//! Payloads are rendered as JSON, YAML or, for people, as an audit table
//! for reports and pretty JSON for target documents.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use fieldmap_core::{Action, DryRunReport, MappingOutput};
use serde::Serialize;
use std::io::{self, Write};
use tracing::trace;

/// Trait for formatting output with specialized support for mapping payloads
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format the payload of a mapping pass
    fn format_mapping_output(&self, output: &MappingOutput, use_color: bool) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty | OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }

    fn format_mapping_output(&self, output: &MappingOutput, use_color: bool) -> Result<String> {
        match (self, output) {
            (OutputFormat::Human, MappingOutput::Report(report)) => Ok(format_report_human(report, use_color)),
            _ => self.format(output),
        }
    }
}

impl OutputFormat {
    /// Format used when the payload is written to a file; the human audit
    /// table is for terminals only
    pub fn for_file(self) -> Self {
        match self {
            OutputFormat::Human => OutputFormat::JsonPretty,
            other => other,
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        self.writeln(formatted.trim_end())
    }

    /// Write a mapping payload. Reports only carry masked values, targets are
    /// never traced.
    pub fn mapping_output(&mut self, output: &MappingOutput) -> Result<()> {
        if let MappingOutput::Report(report) = output {
            trace!(entries = report.mappings.len(), "Writing dry-run report");
        }
        let formatted = self.format.format_mapping_output(output, self.use_color)?;
        self.writeln(formatted.trim_end())
    }
}

/// Render a report as the audit table, coloring each entry by its action
pub fn format_report_human(report: &DryRunReport, use_color: bool) -> String {
    let text = report.audit_report();
    if !use_color {
        return text;
    }

    text.lines()
        .map(|line| colorize_audit_line(line, report))
        .collect::<Vec<_>>()
        .join("\n")
}

fn colorize_audit_line(line: &str, report: &DryRunReport) -> String {
    if line.starts_with("===") || line.starts_with("---") {
        return line.bold().to_string();
    }
    if line.starts_with("Coverage:") {
        return if report.has_errors() {
            line.yellow().to_string()
        } else {
            line.green().to_string()
        };
    }

    let action = line
        .strip_prefix("  [")
        .and_then(|rest| rest.split(']').next());
    match action {
        Some(word) if word == Action::Set.as_str() => line.green().to_string(),
        Some(word) if word == Action::Skipped.as_str() => line.dimmed().to_string(),
        Some(word) if word == Action::Error.as_str() => line.red().to_string(),
        _ => line.to_string(),
    }
}
