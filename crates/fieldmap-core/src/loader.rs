//! Loading of configuration and data documents by reference
//!
//! The engine never parses files itself; it asks a [`ResourceLoader`] for an
//! already-parsed tree.

use crate::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Source of parsed documents
pub trait ResourceLoader {
    /// Load and parse the document named by `reference`
    fn load(&self, reference: &str) -> Result<Value>;
}

impl<T: ResourceLoader + ?Sized> ResourceLoader for &T {
    fn load(&self, reference: &str) -> Result<Value> {
        (**self).load(reference)
    }
}

/// Loads files below a base directory.
///
/// A leading `/` in a reference is relative to the base directory, so
/// `/2.mapping-config.yml` and `2.mapping-config.yml` name the same file.
/// References may not leave the base directory through `..`.
/// `.yml` and `.yaml` files are parsed as YAML, everything else as JSON.
#[derive(Debug, Clone)]
pub struct FileResourceLoader {
    base_dir: PathBuf,
}

impl FileResourceLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// File path of a reference
    pub fn resolve(&self, reference: &str) -> PathBuf {
        self.base_dir.join(reference.trim_start_matches('/'))
    }
}

impl Default for FileResourceLoader {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ResourceLoader for FileResourceLoader {
    fn load(&self, reference: &str) -> Result<Value> {
        let escapes = Path::new(reference.trim_start_matches('/'))
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if escapes {
            return Err(Error::resource(reference, "reference escapes the base directory"));
        }

        let path = self.resolve(reference);
        debug!(reference, path = %path.display(), "Loading resource");

        if !path.is_file() {
            return Err(Error::resource(
                reference,
                format!("file not found: {}", path.display()),
            ));
        }

        let content = fs::read_to_string(&path).map_err(|e| Error::Resource {
            reference: reference.to_string(),
            message: format!("cannot read {}: {}", path.display(), e),
            source: Some(e.into()),
        })?;

        if is_yaml(&path) {
            serde_yaml::from_str(&content).map_err(|e| Error::Resource {
                reference: reference.to_string(),
                message: format!("invalid YAML: {}", e),
                source: Some(e.into()),
            })
        } else {
            serde_json::from_str(&content).map_err(|e| Error::Resource {
                reference: reference.to_string(),
                message: format!("invalid JSON: {}", e),
                source: Some(e.into()),
            })
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

/// Documents held in memory, keyed by reference
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    resources: HashMap<String, Value>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document
    pub fn with(mut self, reference: impl Into<String>, value: Value) -> Self {
        self.insert(reference, value);
        self
    }

    pub fn insert(&mut self, reference: impl Into<String>, value: Value) {
        self.resources.insert(reference.into(), value);
    }
}

impl ResourceLoader for InMemoryLoader {
    fn load(&self, reference: &str) -> Result<Value> {
        self.resources
            .get(reference)
            .cloned()
            .ok_or_else(|| Error::resource(reference, "no such resource"))
    }
}
