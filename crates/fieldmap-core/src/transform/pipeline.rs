//! Transform pipeline implementation
//!
//! Applies compiled transforms to a resolved value in declaration order. The
//! value flowing through the pipeline is an `Option<Value>` so that an absent
//! source can still be filled by `default` or `concat`.
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

use super::types::{Placeholder, Replacer, Transform, TransformError, TransformKind};
use crate::config::{Contexts, TransformDef};
use crate::operand::Scope;
use crate::value::{as_number, render};
use crate::Result;
use serde_json::{Number, Value};

type StepResult = std::result::Result<Option<Value>, TransformError>;

/// An ordered list of compiled transforms
#[derive(Debug, Clone, Default)]
pub struct TransformPipeline {
    transforms: Vec<Transform>,
}

impl TransformPipeline {
    /// Compile transform definitions; `location` is the owning rule
    pub fn compile(defs: &[TransformDef], contexts: &Contexts, location: &str) -> Result<Self> {
        let transforms = defs
            .iter()
            .enumerate()
            .map(|(i, def)| Transform::compile(def, contexts, &format!("{}.transforms[{}]", location, i)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { transforms })
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Run every transform in order, stopping at the first failure
    pub fn apply(&self, input: Option<Value>, scope: &Scope<'_>) -> StepResult {
        self.transforms
            .iter()
            .try_fold(input, |value, transform| apply_transform(transform, value, scope))
    }
}

/// Apply a single transform
fn apply_transform(transform: &Transform, input: Option<Value>, scope: &Scope<'_>) -> StepResult {
    // Only these two produce a value from nothing
    match transform {
        Transform::Default(fallback) => return Ok(Some(input.unwrap_or_else(|| fallback.clone()))),
        Transform::Concat { parts, separator } => {
            let joined = parts
                .iter()
                .map(|part| match part.resolve(scope) {
                    None | Some(Value::Null) => String::new(),
                    Some(value) => render(value),
                })
                .collect::<Vec<_>>()
                .join(separator);
            return Ok(Some(Value::String(joined)));
        }
        _ => {}
    }

    let Some(value) = input else {
        return Ok(None);
    };

    let output = match transform {
        Transform::Trim => map_string(value, |s| s.trim().to_string()),
        Transform::Upper => map_string(value, |s| s.to_uppercase()),
        Transform::Lower => map_string(value, |s| s.to_lowercase()),
        Transform::TitleCase => map_string(value, title_case),
        Transform::ToInt => to_int(&value)?,
        Transform::ToNumber => to_number(&value)?,
        Transform::ToBool => to_bool(&value)?,
        Transform::ToString => Value::String(render(&value)),
        Transform::Format(pattern) => Value::String(match pattern.placeholder() {
            Placeholder::Str => pattern.fill(&render(&value)),
            Placeholder::Int => pattern.fill_int(integral(&value, TransformKind::Format)?),
            Placeholder::Float { .. } => pattern.fill_float(numeric(&value, TransformKind::Format, "number")?),
        }),
        Transform::Replace { from, to } => {
            let text = render(&value);
            let replaced = match from {
                Replacer::Literal(needle) => text.replace(needle.as_str(), to),
                Replacer::Pattern(regex) => regex.replace_all(&text, to.as_str()).into_owned(),
            };
            Value::String(replaced)
        }
        Transform::MapLookup { table, strict } => {
            let key = render(&value);
            match table.get(&key) {
                Some(mapped) => mapped.clone(),
                None if *strict => {
                    return Err(TransformError::LookupMiss {
                        kind: TransformKind::MapLookup,
                        value: key,
                    })
                }
                None => value,
            }
        }
        Transform::Default(_) | Transform::Concat { .. } => value,
    };

    Ok(Some(output))
}

fn map_string(value: Value, f: impl FnOnce(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(&s)),
        other => other,
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            word_start = true;
            out.push(ch);
        } else if word_start {
            word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

fn coercion(kind: TransformKind, value: &Value, target: &'static str) -> TransformError {
    TransformError::Coercion {
        kind,
        value: render(value),
        target,
    }
}

fn numeric(value: &Value, kind: TransformKind, target: &'static str) -> std::result::Result<f64, TransformError> {
    match value {
        Value::Number(_) | Value::String(_) => as_number(value).ok_or_else(|| coercion(kind, value, target)),
        _ => Err(coercion(kind, value, target)),
    }
}

/// Whole numbers only; `4.8` is a coercion failure rather than `4`
fn integral(value: &Value, kind: TransformKind) -> std::result::Result<i64, TransformError> {
    if let Value::Number(n) = value {
        if let Some(i) = n.as_i64() {
            return Ok(i);
        }
    }
    if let Value::String(s) = value {
        if let Ok(i) = s.trim().parse::<i64>() {
            return Ok(i);
        }
    }
    let n = numeric(value, kind, "integer")?;
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Ok(n as i64)
    } else {
        Err(coercion(kind, value, "integer"))
    }
}

fn to_int(value: &Value) -> std::result::Result<Value, TransformError> {
    let kind = TransformKind::ToInt;
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        Value::String(s) => {
            if let Ok(i) = s.trim().parse::<i64>() {
                return Ok(Value::from(i));
            }
            truncate(numeric(value, kind, "integer")?).ok_or_else(|| coercion(kind, value, "integer"))
        }
        Value::Number(_) => {
            truncate(numeric(value, kind, "integer")?).ok_or_else(|| coercion(kind, value, "integer"))
        }
        _ => Err(coercion(kind, value, "integer")),
    }
}

fn truncate(n: f64) -> Option<Value> {
    let truncated = n.trunc();
    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64 {
        Some(Value::from(truncated as i64))
    } else {
        None
    }
}

fn to_number(value: &Value) -> std::result::Result<Value, TransformError> {
    let kind = TransformKind::ToNumber;
    match value {
        Value::Number(_) => Ok(value.clone()),
        Value::String(s) => {
            let text = s.trim();
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::from(i));
            }
            as_number(value)
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| coercion(kind, value, "number"))
        }
        _ => Err(coercion(kind, value, "number")),
    }
}

fn to_bool(value: &Value) -> std::result::Result<Value, TransformError> {
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 0.0 => Some(false),
            Some(x) if x == 1.0 => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Some(true),
            "false" | "no" | "0" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    };
    parsed
        .map(Value::Bool)
        .ok_or_else(|| coercion(TransformKind::ToBool, value, "boolean"))
}
