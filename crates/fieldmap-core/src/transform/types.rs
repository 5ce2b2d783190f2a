//! Core types for the transform system
//!
//! This module defines the closed set of transform kinds, their compiled form
//! and the per-rule errors raised when a transform cannot be applied.
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

use crate::config::{Contexts, TransformDef};
use crate::operand::Operand;
use crate::{Error, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Errors raised while applying a transform to a value.
///
/// These are per-rule failures: the engine records them as `ERROR` entries
/// and carries on with the next rule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Type coercion failed
    #[error("{kind}: cannot convert '{value}' to {target}")]
    Coercion {
        kind: TransformKind,
        value: String,
        target: &'static str,
    },

    /// Strict lookup without a matching entry
    #[error("{kind}: no entry for '{value}'")]
    LookupMiss { kind: TransformKind, value: String },
}

impl TransformError {
    /// The transform that failed
    pub fn kind(&self) -> TransformKind {
        match self {
            Self::Coercion { kind, .. } | Self::LookupMiss { kind, .. } => *kind,
        }
    }
}

/// Closed set of transform kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Trim,
    Upper,
    Lower,
    TitleCase,
    ToInt,
    ToNumber,
    ToBool,
    ToString,
    Format,
    Replace,
    Concat,
    MapLookup,
    Default,
}

impl TransformKind {
    /// Look up a kind by its configuration name
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "trim" => Self::Trim,
            "upper" => Self::Upper,
            "lower" => Self::Lower,
            "titleCase" => Self::TitleCase,
            "toInt" => Self::ToInt,
            "toNumber" => Self::ToNumber,
            "toBool" => Self::ToBool,
            "toString" => Self::ToString,
            "format" => Self::Format,
            "replace" => Self::Replace,
            "concat" => Self::Concat,
            "mapLookup" => Self::MapLookup,
            "default" => Self::Default,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Trim => "trim",
            Self::Upper => "upper",
            Self::Lower => "lower",
            Self::TitleCase => "titleCase",
            Self::ToInt => "toInt",
            Self::ToNumber => "toNumber",
            Self::ToBool => "toBool",
            Self::ToString => "toString",
            Self::Format => "format",
            Self::Replace => "replace",
            Self::Concat => "concat",
            Self::MapLookup => "mapLookup",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The single placeholder of a `format` pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `%s`
    Str,
    /// `%d`
    Int,
    /// `%f` or `%.Nf`
    Float { precision: usize },
}

/// Flags of a `format` placeholder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags {
    /// `-`: pad on the right
    pub left: bool,
    /// `0`: pad numbers with zeros after the sign
    pub zero: bool,
    /// `,`: group integer digits by thousands
    pub grouping: bool,
    /// `+`: always print the sign of a number
    pub plus: bool,
}

/// A printf-style pattern with exactly one placeholder.
///
/// The placeholder is `%[flags][width][.precision]conv` with flags from
/// `-0,+`, conversions `s`, `d` and `f`, and precision only on `f`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPattern {
    prefix: String,
    placeholder: Placeholder,
    flags: FormatFlags,
    width: usize,
    suffix: String,
}

impl FormatPattern {
    /// Parse a pattern; `%%` is a literal percent sign
    pub fn parse(pattern: &str) -> std::result::Result<Self, String> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut found: Option<(Placeholder, FormatFlags, usize)> = None;
        let mut chars = pattern.chars().peekable();
        let unsupported = |spec: &str| format!("unsupported placeholder '%{}' in '{}'", spec, pattern);

        while let Some(ch) = chars.next() {
            let out = if found.is_some() { &mut suffix } else { &mut prefix };
            if ch != '%' {
                out.push(ch);
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                out.push('%');
                continue;
            }

            let mut spec = String::new();
            let mut flags = FormatFlags::default();
            while let Some(&flag) = chars.peek() {
                match flag {
                    '-' => flags.left = true,
                    '0' => flags.zero = true,
                    ',' => flags.grouping = true,
                    '+' => flags.plus = true,
                    _ => break,
                }
                spec.push(flag);
                chars.next();
            }

            let mut width = String::new();
            while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                width.push(d);
                chars.next();
            }
            spec.push_str(&width);

            let mut precision = None;
            if chars.peek() == Some(&'.') {
                chars.next();
                let mut digits = String::new();
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    digits.push(d);
                    chars.next();
                }
                spec.push('.');
                spec.push_str(&digits);
                precision = Some(digits.parse::<usize>().map_err(|_| unsupported(&spec))?);
            }

            let conversion = chars.next().ok_or_else(|| format!("dangling '%' in '{}'", pattern))?;
            spec.push(conversion);
            let placeholder = match (conversion, precision) {
                ('s', None) if !flags.zero && !flags.grouping && !flags.plus => Placeholder::Str,
                ('d', None) => Placeholder::Int,
                ('f', precision) => Placeholder::Float {
                    precision: precision.unwrap_or(6),
                },
                _ => return Err(unsupported(&spec)),
            };
            let width = if width.is_empty() {
                0
            } else {
                width.parse::<usize>().map_err(|_| unsupported(&spec))?
            };

            if found.replace((placeholder, flags, width)).is_some() {
                return Err(format!("pattern '{}' has more than one placeholder", pattern));
            }
        }

        let (placeholder, flags, width) =
            found.ok_or_else(|| format!("pattern '{}' has no placeholder", pattern))?;
        Ok(Self {
            prefix,
            placeholder,
            flags,
            width,
            suffix,
        })
    }

    pub fn placeholder(&self) -> Placeholder {
        self.placeholder
    }

    pub fn flags(&self) -> FormatFlags {
        self.flags
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Substitute a string argument, padded to the field width
    pub fn fill(&self, argument: &str) -> String {
        self.wrap(self.pad("", argument))
    }

    /// Substitute an integer argument
    pub fn fill_int(&self, n: i64) -> String {
        let digits = n.unsigned_abs().to_string();
        let digits = if self.flags.grouping { group_thousands(&digits) } else { digits };
        self.wrap(self.pad(self.sign(n < 0), &digits))
    }

    /// Substitute a floating-point argument with the placeholder's precision
    pub fn fill_float(&self, n: f64) -> String {
        let precision = match self.placeholder {
            Placeholder::Float { precision } => precision,
            _ => 6,
        };
        let body = format!("{:.*}", precision, n.abs());
        let body = match body.split_once('.') {
            Some((int, frac)) if self.flags.grouping => format!("{}.{}", group_thousands(int), frac),
            None if self.flags.grouping => group_thousands(&body),
            _ => body,
        };
        let negative = n.is_sign_negative() && body.chars().any(|c| c.is_ascii_digit() && c != '0');
        self.wrap(self.pad(self.sign(negative), &body))
    }

    fn sign(&self, negative: bool) -> &'static str {
        match (negative, self.flags.plus) {
            (true, _) => "-",
            (false, true) => "+",
            (false, false) => "",
        }
    }

    fn pad(&self, sign: &str, body: &str) -> String {
        let len = sign.chars().count() + body.chars().count();
        let fill = self.width.saturating_sub(len);
        if fill == 0 {
            format!("{}{}", sign, body)
        } else if self.flags.left {
            format!("{}{}{}", sign, body, " ".repeat(fill))
        } else if self.flags.zero && self.placeholder != Placeholder::Str {
            format!("{}{}{}", sign, "0".repeat(fill), body)
        } else {
            format!("{}{}{}", " ".repeat(fill), sign, body)
        }
    }

    fn wrap(&self, field: String) -> String {
        format!("{}{}{}", self.prefix, field, self.suffix)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Match strategy for `replace`
#[derive(Debug, Clone)]
pub enum Replacer {
    Literal(String),
    Pattern(Regex),
}

/// A compiled transform step
#[derive(Debug, Clone)]
pub enum Transform {
    Trim,
    Upper,
    Lower,
    TitleCase,
    ToInt,
    ToNumber,
    ToBool,
    ToString,
    Format(FormatPattern),
    Replace { from: Replacer, to: String },
    Concat { parts: Vec<Operand>, separator: String },
    MapLookup { table: HashMap<String, Value>, strict: bool },
    Default(Value),
}

impl Transform {
    /// Compile a transform definition; `location` names it in error messages
    pub fn compile(def: &TransformDef, contexts: &Contexts, location: &str) -> Result<Self> {
        let kind = TransformKind::from_name(&def.kind).ok_or_else(|| {
            Error::configuration(
                format!("{}.kind", location),
                format!("unknown transform kind '{}'", def.kind),
            )
        })?;
        let params = Params {
            params: &def.params,
            location,
            kind,
        };

        let transform = match kind {
            TransformKind::Trim => Self::Trim,
            TransformKind::Upper => Self::Upper,
            TransformKind::Lower => Self::Lower,
            TransformKind::TitleCase => Self::TitleCase,
            TransformKind::ToInt => Self::ToInt,
            TransformKind::ToNumber => Self::ToNumber,
            TransformKind::ToBool => Self::ToBool,
            TransformKind::ToString => Self::ToString,
            TransformKind::Format => {
                let pattern = params.required_str("pattern")?;
                Self::Format(FormatPattern::parse(pattern).map_err(|e| params.invalid("pattern", e))?)
            }
            TransformKind::Replace => {
                let from = params.required_str("from")?;
                let to = params.optional_str("to")?.unwrap_or_default().to_string();
                let from = if params.optional_bool("regex")? {
                    Replacer::Pattern(
                        Regex::new(from).map_err(|e| params.invalid("from", format!("invalid regex: {}", e)))?,
                    )
                } else if from.is_empty() {
                    return Err(params.invalid("from", "must not be empty"));
                } else {
                    Replacer::Literal(from.to_string())
                };
                Self::Replace { from, to }
            }
            TransformKind::Concat => {
                let parts = match params.params.get("parts") {
                    Some(Value::Array(parts)) => parts,
                    _ => return Err(params.invalid("parts", "expected a list of parts")),
                };
                let parts = parts
                    .iter()
                    .enumerate()
                    .map(|(i, part)| Operand::compile(part, contexts, &format!("{}.parts[{}]", location, i)))
                    .collect::<Result<Vec<_>>>()?;
                let separator = params.optional_str("separator")?.unwrap_or_default().to_string();
                Self::Concat { parts, separator }
            }
            TransformKind::MapLookup => {
                let table = match params.params.get("table") {
                    Some(Value::Object(table)) => table
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                    _ => return Err(params.invalid("table", "expected a mapping")),
                };
                let strict = params.optional_bool("strict")?;
                Self::MapLookup { table, strict }
            }
            TransformKind::Default => {
                let value = params
                    .params
                    .get("value")
                    .ok_or_else(|| params.invalid("value", "is required"))?;
                Self::Default(value.clone())
            }
        };

        Ok(transform)
    }

    pub fn kind(&self) -> TransformKind {
        match self {
            Self::Trim => TransformKind::Trim,
            Self::Upper => TransformKind::Upper,
            Self::Lower => TransformKind::Lower,
            Self::TitleCase => TransformKind::TitleCase,
            Self::ToInt => TransformKind::ToInt,
            Self::ToNumber => TransformKind::ToNumber,
            Self::ToBool => TransformKind::ToBool,
            Self::ToString => TransformKind::ToString,
            Self::Format(_) => TransformKind::Format,
            Self::Replace { .. } => TransformKind::Replace,
            Self::Concat { .. } => TransformKind::Concat,
            Self::MapLookup { .. } => TransformKind::MapLookup,
            Self::Default(_) => TransformKind::Default,
        }
    }
}

/// Typed access to transform parameters with located errors
struct Params<'a> {
    params: &'a Map<String, Value>,
    location: &'a str,
    kind: TransformKind,
}

impl<'a> Params<'a> {
    fn invalid(&self, name: &str, message: impl fmt::Display) -> Error {
        Error::configuration(
            format!("{}.{}", self.location, name),
            format!("{} {}", self.kind, message),
        )
    }

    fn required_str(&self, name: &str) -> Result<&'a str> {
        self.optional_str(name)?
            .ok_or_else(|| self.invalid(name, "requires a string parameter"))
    }

    fn optional_str(&self, name: &str) -> Result<Option<&'a str>> {
        match self.params.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(self.invalid(name, "expected a string")),
        }
    }

    fn optional_bool(&self, name: &str) -> Result<bool> {
        match self.params.get(name) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(self.invalid(name, "expected a boolean")),
        }
    }
}
