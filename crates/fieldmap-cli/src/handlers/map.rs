//! Map command handler

use super::engine_for;
use crate::cli::MapArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::{OutputFormatter, OutputWriter};
use fieldmap_core::{Action, MapOptions, MappingOutput};
use std::fs;
use tracing::{debug, info, instrument};

/// Handle the map command
#[instrument(skip_all, fields(config_ref = %args.config_ref, data_ref = %args.data_ref))]
pub fn handle_map(args: MapArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::with_details("map_command", &args.config_ref);

    let options = MapOptions::new()
        .dry_run(args.dry_run_or(config.defaults.dry_run))
        .json_dry_run_output(args.json_output_or(config.defaults.json_output));
    info!(dry_run = options.dry_run, json_output = options.json_dry_run_output, "Starting mapping pass");

    let engine = engine_for(args.base_dir.as_deref(), config);
    let payload = timer
        .span()
        .in_scope(|| engine.map_data(&args.config_ref, &args.data_ref, options))?;

    match &args.save_to {
        Some(path) => {
            let formatted = output.format().for_file().format_mapping_output(&payload, false)?;
            fs::write(path, formatted)?;
            debug!(path = %path.display(), "Payload written");
            output.success(&format!("✓ {} saved to {}", payload_name(&payload), path.display()))?;
        }
        None => output.mapping_output(&payload)?,
    }

    if let MappingOutput::Report(report) = &payload {
        let failed = report.entries_with(Action::Error).count();
        if failed > 0 {
            output.warning(&format!("{} rule(s) failed, see the report for reasons", failed))?;
        }
    }

    Ok(())
}

fn payload_name(payload: &MappingOutput) -> &'static str {
    match payload {
        MappingOutput::Report(_) => "Dry-run report",
        MappingOutput::Target(_) => "Target document",
    }
}
