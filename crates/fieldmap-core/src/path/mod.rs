//! Path resolution against parsed documents
//!
//! Paths use `.` to descend into mappings and `[i]` to index sequences.
//! Resolution is total: unknown keys, out-of-range indices and type
//! mismatches all yield `None`, which is distinct from an explicit null.
//!
//! ```
//! use fieldmap_core::path::PathExpr;
//! use serde_json::json;
//!
//! let doc = json!({"user": {"tags": ["a", "b"]}, "gone": null});
//! let path = PathExpr::parse("user.tags[1]").unwrap();
//! assert_eq!(path.resolve(&doc), Some(&json!("b")));
//!
//! assert_eq!(PathExpr::parse("gone").unwrap().resolve(&doc), Some(&json!(null)));
//! assert_eq!(PathExpr::parse("missing").unwrap().resolve(&doc), None);
//! ```
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod parser;

pub use error::PathError;
pub use parser::{Parser, Segment};

use serde_json::Value;
use std::fmt;

/// A parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    raw: String,
    segments: Vec<Segment>,
}

impl PathExpr {
    /// Parse a path expression
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let segments = Parser::new(path).parse()?;
        Ok(Self {
            raw: path.to_string(),
            segments,
        })
    }

    /// The path as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when the path selects the whole document
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolve the path against a document
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(document, |current, segment| match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(key),
                (Segment::Index(index), Value::Array(items)) => items.get(*index),
                _ => None,
            })
    }

    /// Name of the last key segment, if any
    pub fn last_key(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|segment| match segment {
            Segment::Key(key) => Some(key.as_str()),
            Segment::Index(_) => None,
        })
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse and resolve in one step; a malformed path resolves to `None`.
pub fn resolve<'a>(path: &str, document: &'a Value) -> Option<&'a Value> {
    PathExpr::parse(path).ok()?.resolve(document)
}

/// Join a base path and a relative path with a single `.` separator.
///
/// Root markers on `rest` are dropped and runs of separators collapse, so
/// `join("customer.", "$.name")` yields `customer.name`.
pub fn join(base: &str, rest: &str) -> String {
    let rest = strip_root(rest);
    let base = base.strip_prefix('/').unwrap_or(base);
    let mut joined = String::with_capacity(base.len() + rest.len() + 1);

    for ch in base.chars().chain(std::iter::once('.')).chain(rest.chars()) {
        if ch == '.' && (joined.is_empty() || joined.ends_with('.')) {
            continue;
        }
        joined.push(ch);
    }

    while joined.ends_with('.') {
        joined.pop();
    }
    joined
}

/// Last name segment of a dotted target field, ignoring any index suffix.
///
/// `contact.email` -> `email`, `item_0.code` -> `code`, `lines[2]` -> `lines`.
pub fn last_segment(field: &str) -> &str {
    let tail = field.rsplit('.').next().unwrap_or(field);
    match tail.find('[') {
        Some(pos) => &tail[..pos],
        None => tail,
    }
}

fn strip_root(path: &str) -> &str {
    if let Some(rest) = path.strip_prefix("$.") {
        rest
    } else if path == "$" {
        ""
    } else {
        path.strip_prefix('/').unwrap_or(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "user": {
                "name": "Ada",
                "emails": ["ada@example.org", "a.l@example.org"],
                "nickname": null
            },
            "items": [{"sku": "A-1"}, {"sku": "B-2"}]
        })
    }

    #[test]
    fn test_resolve_nested() {
        let doc = sample();
        assert_eq!(resolve("user.name", &doc), Some(&json!("Ada")));
        assert_eq!(resolve("items[1].sku", &doc), Some(&json!("B-2")));
        assert_eq!(resolve("$.user.emails[0]", &doc), Some(&json!("ada@example.org")));
    }

    #[test]
    fn test_null_is_not_absent() {
        let doc = sample();
        assert_eq!(resolve("user.nickname", &doc), Some(&Value::Null));
        assert_eq!(resolve("user.missing", &doc), None);
    }

    #[test]
    fn test_type_mismatches_are_absent() {
        let doc = sample();
        assert_eq!(resolve("user.name[0]", &doc), None);
        assert_eq!(resolve("items.sku", &doc), None);
        assert_eq!(resolve("items[9]", &doc), None);
        assert_eq!(resolve("user.name.first", &doc), None);
    }

    #[test]
    fn test_malformed_path_resolves_to_absent() {
        assert_eq!(resolve("items[", &sample()), None);
    }

    #[test]
    fn test_root_path() {
        let doc = sample();
        let root = PathExpr::parse("$").unwrap();
        assert!(root.is_root());
        assert_eq!(root.resolve(&doc), Some(&doc));
    }

    #[test]
    fn test_join_normalizes_separators() {
        assert_eq!(join("customer", "name"), "customer.name");
        assert_eq!(join("customer.", ".name"), "customer.name");
        assert_eq!(join("customer", "$.name"), "customer.name");
        assert_eq!(join("/orders", "[0].id"), "orders.[0].id");
        assert_eq!(join("", "name"), "name");
        assert_eq!(join("base", ""), "base");
    }

    #[test]
    fn test_joined_index_path_resolves() {
        let doc = sample();
        assert_eq!(resolve(&join("items", "[0].sku"), &doc), Some(&json!("A-1")));
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("contact.email"), "email");
        assert_eq!(last_segment("item_0.code"), "code");
        assert_eq!(last_segment("ssn"), "ssn");
        assert_eq!(last_segment("lines[2]"), "lines");
    }

    #[test]
    fn test_last_key() {
        let path = PathExpr::parse("a.b[3]").unwrap();
        assert_eq!(path.last_key(), Some("b"));
    }
}
