//! Command handlers for CLI subcommands
//!
//! Each subcommand lives in its own module under `handlers/`.

mod completions;
mod map;
mod validate;

pub use completions::handle_completions;
pub use map::handle_map;
pub use validate::handle_validate;

use crate::config::Config;
use fieldmap_core::{FileResourceLoader, MappingEngine};
use std::path::Path;

/// Engine reading references relative to `--base-dir`, else `paths.base_dir`
pub(crate) fn engine_for(base_dir: Option<&Path>, config: &Config) -> MappingEngine {
    let base_dir = base_dir.unwrap_or(config.paths.base_dir.as_path());
    tracing::debug!(base_dir = %base_dir.display(), "Resolving references");
    MappingEngine::new(FileResourceLoader::new(base_dir))
}
