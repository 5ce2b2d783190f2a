//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// fieldmap - declarative data mapping with dry-run audit reports
///
/// Maps a source document onto a flat target document following a mapping
/// configuration, and reports what every rule did without leaking
/// sensitive values.
#[derive(Parser, Debug)]
#[command(
    name = "fieldmap",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to the tool configuration file
    #[arg(short, long, global = true, env = "FIELDMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results [default: from configuration, else human]
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one mapping pass over a data document
    Map(MapArgs),

    /// Compile a mapping configuration and report problems
    Validate(ValidateArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the map command
#[derive(Parser, Debug)]
pub struct MapArgs {
    /// Reference to the mapping configuration (JSON or YAML)
    #[arg(value_name = "CONFIG_REF")]
    pub config_ref: String,

    /// Reference to the source data document (JSON or YAML)
    #[arg(value_name = "DATA_REF")]
    pub data_ref: String,

    /// Evaluate every rule without producing a target document
    #[arg(long, conflicts_with = "apply")]
    pub dry_run: bool,

    /// Write mapped values into the target document
    #[arg(long)]
    pub apply: bool,

    /// Return the dry-run report instead of the target document
    #[arg(long, conflicts_with = "target_output")]
    pub json_output: bool,

    /// Return the target document instead of the report
    #[arg(long)]
    pub target_output: bool,

    /// Save the payload to a file instead of printing it
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,

    /// Directory references are resolved against
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Reference to the mapping configuration (JSON or YAML)
    #[arg(value_name = "CONFIG_REF")]
    pub config_ref: String,

    /// Directory references are resolved against
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self, configured: bool) -> bool {
        !self.no_color && configured && std::io::stdout().is_terminal()
    }
}

impl MapArgs {
    /// Dry-run toggle: an explicit flag wins over the configured default
    pub fn dry_run_or(&self, default: bool) -> bool {
        match (self.dry_run, self.apply) {
            (true, _) => true,
            (_, true) => false,
            _ => default,
        }
    }

    /// Report-output toggle: an explicit flag wins over the configured default
    pub fn json_output_or(&self, default: bool) -> bool {
        match (self.json_output, self.target_output) {
            (true, _) => true,
            (_, true) => false,
            _ => default,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
