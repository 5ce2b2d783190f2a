//! fieldmap CLI - run declarative data mappings from the command line
//!
//! Loads a mapping configuration and a data document by reference, runs one
//! mapping pass and prints (or saves) the target document or the dry-run
//! audit report.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    let result = Config::load_with_file(cli.config.as_deref()).and_then(|config| {
        let use_color = cli.use_color(config.output.color);
        control::set_override(use_color);

        if let Err(e) = init_logging(&cli, &config) {
            eprintln!("Failed to initialize logging: {}", e);
        }

        run(cli, &config, use_color)
    });

    if let Err(e) = result {
        eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));
        process::exit(e.exit_code());
    }
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command, request_id = logging::request_id()))]
fn run(cli: Cli, config: &Config, use_color: bool) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let format = match cli.output {
        Some(format) => format,
        None => config.output_format()?,
    };
    let mut output = OutputWriter::new(format, use_color, cli.quiet);

    tracing::info!(verbosity = cli.verbosity_level(), "Executing command");

    match cli.command {
        Commands::Map(args) => handlers::handle_map(args, config, &mut output),
        Commands::Validate(args) => handlers::handle_validate(args, config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let verbosity = cli.verbosity_level();
    let mut logging_config = LoggingConfig::from_verbosity(verbosity);

    logging_config.merge_with_settings(verbosity, &config.logging.level, config.log_format()?);
    logging_config.merge_with_env();

    if cli.quiet {
        logging_config.quiet();
    }

    logging::init_logging(logging_config)
}
