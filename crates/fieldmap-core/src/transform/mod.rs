//! Value transforms applied to resolved source values
//!
//! Transforms are compiled from [`TransformDef`](crate::config::TransformDef)
//! and run in declaration order by a [`TransformPipeline`].
//!
//! # Module Organization
//!
//! - [`types`] - Transform kinds, compiled transforms and errors
//! - [`pipeline`] - Ordered application of transforms
//!
//! # Examples
//!
//! ```
//! use fieldmap_core::config::{Contexts, TransformDef};
//! use fieldmap_core::operand::Scope;
//! use fieldmap_core::transform::TransformPipeline;
//! use serde_json::json;
//!
//! let defs = vec![
//!     TransformDef::new("trim"),
//!     TransformDef::new("titleCase"),
//!     TransformDef::new("format").with_param("pattern", json!("Name: %s")),
//! ];
//! let contexts = Contexts::default();
//! let pipeline = TransformPipeline::compile(&defs, &contexts, "mappings[0]").unwrap();
//!
//! let doc = json!({});
//! let out = pipeline.apply(Some(json!("  ada LOVELACE ")), &Scope::document(&doc)).unwrap();
//! assert_eq!(out, Some(json!("Name: Ada Lovelace")));
//! ```
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

// Core types and error definitions
pub mod types;

// Ordered application of transforms
pub mod pipeline;

#[cfg(test)]
mod tests;

pub use pipeline::TransformPipeline;
pub use types::{FormatPattern, Placeholder, Replacer, Transform, TransformError, TransformKind};
