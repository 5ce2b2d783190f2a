//! Fieldmap Core - Declarative data mapping with dry-run auditing
//!
//! This crate maps fields of a source document into a flat target document
//! according to a declarative configuration, and produces a dry-run report
//! describing what each rule did, with sensitive values masked.
//!
//! # Main Components
//!
//! - **Path Resolver**: dotted and bracketed paths over `serde_json::Value` trees
//! - **Sensitivity Classifier**: keyword-based field classification and masking
//! - **Conditions and Transforms**: guards and value pipelines compiled from configuration
//! - **Collection Expander**: per-item mappings over sequences
//! - **Report Builder**: append-only audit entries and coverage
//! - **Mapping Engine**: the orchestrator behind `map_data`
//!
//! # Example
//!
//! ```
//! use fieldmap_core::{MapOptions, MappingEngine, Result};
//! use serde_json::json;
//!
//! fn example() -> Result<()> {
//!     let config = json!({
//!         "mappings": [
//!             {"source": "u.email", "target": "contact.email"},
//!             {"source": "u.ssn", "target": "ssn", "required": true}
//!         ]
//!     });
//!     let data = json!({"u": {"email": "ada@example.org"}});
//!
//!     let options = MapOptions::default().json_dry_run_output(true);
//!     let output = MappingEngine::map_values(&config, &data, "inline", options)?;
//!     let report = output.as_report().expect("report requested");
//!
//!     assert_eq!(report.mappings[0].transformed_value.as_deref(), Some("a***a@example.org"));
//!     assert_eq!(report.coverage.coverage_percent, 50.0);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod collection;
pub mod condition;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod operand;
pub mod path;
pub mod report;
pub mod sensitivity;
pub mod target;
pub mod transform;
pub mod value;

#[cfg(test)]
mod proptest_strategies;

// Re-export main types for convenience
pub use config::{compile, CompiledConfig, MappingConfig};
pub use engine::{run, MapOptions, MappingEngine, MappingOutput, MappingRun};
pub use error::{Error, Result};
pub use loader::{FileResourceLoader, InMemoryLoader, ResourceLoader};
pub use path::{PathError, PathExpr};
pub use report::{Action, CoverageSummary, DryRunReport, MappingEntryReport};
pub use sensitivity::{is_sensitive, mask_value, Sensitivity};
pub use target::TargetDocument;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_fatal_error_has_no_report() {
        let config = json!({"mappings": [{"source": "a", "target": "b",
                                          "condition": {"op": "approxEquals", "left": "$.a", "right": 1}}]});
        let err = MappingEngine::map_values(&config, &json!({}), "inline", MapOptions::default()).unwrap_err();
        assert!(err.is_configuration());
    }
}
