//! Operands shared by conditions and the `concat` transform
//!
//! A string operand is a path when it starts with `$` (resolved in the current
//! scope) or when its first segment names a defined context (resolved under the
//! context's base path against the whole document). Anything else is a literal.

use crate::config::Contexts;
use crate::path::{self, PathExpr};
use crate::value::render;
use crate::{Error, Result};
use serde_json::Value;
use std::fmt;

/// Values visible while evaluating a rule
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    /// The whole source document
    pub document: &'a Value,
    /// `$` for this evaluation: the document, or the current collection item
    pub current: &'a Value,
}

impl<'a> Scope<'a> {
    /// Scope of a top-level rule
    pub fn document(document: &'a Value) -> Self {
        Self {
            document,
            current: document,
        }
    }

    /// Scope of a collection item
    pub fn item(document: &'a Value, item: &'a Value) -> Self {
        Self {
            document,
            current: item,
        }
    }
}

/// Where a path operand is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathScope {
    /// Relative to [`Scope::current`]
    Current,
    /// Relative to [`Scope::document`]
    Document,
}

/// A condition or concat operand
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    Path {
        /// Operand as written in the configuration
        text: String,
        scope: PathScope,
        path: PathExpr,
    },
}

impl Operand {
    /// Classify and compile a configuration value
    pub fn compile(value: &Value, contexts: &Contexts, location: &str) -> Result<Self> {
        let Value::String(text) = value else {
            return Ok(Self::Literal(value.clone()));
        };

        let parse = |raw: &str| {
            PathExpr::parse(raw).map_err(|e| Error::configuration(location, e.to_string()))
        };

        if text == "$" || text.starts_with("$.") || text.starts_with("$[") {
            return Ok(Self::Path {
                text: text.clone(),
                scope: PathScope::Current,
                path: parse(text)?,
            });
        }

        if let Some((context, rest)) = contexts.split_context_reference(text) {
            return Ok(Self::Path {
                text: text.clone(),
                scope: PathScope::Document,
                path: parse(&path::join(&context.base_path, rest))?,
            });
        }

        Ok(Self::Literal(value.clone()))
    }

    /// Resolve the operand; `None` when a path operand is absent
    pub fn resolve<'a>(&'a self, scope: &Scope<'a>) -> Option<&'a Value> {
        match self {
            Self::Literal(value) => Some(value),
            Self::Path { scope: PathScope::Current, path, .. } => path.resolve(scope.current),
            Self::Path { scope: PathScope::Document, path, .. } => path.resolve(scope.document),
        }
    }

    pub fn is_path(&self) -> bool {
        matches!(self, Self::Path { .. })
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.write_str(&render(value)),
            Self::Path { text, .. } => f.write_str(text),
        }
    }
}
