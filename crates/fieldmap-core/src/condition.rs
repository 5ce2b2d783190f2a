//! Guard conditions attached to rules
//!
//! Conditions are compiled once from [`ConditionDef`] (unknown operators and
//! invalid patterns are fatal there) and evaluated per rule or per collection
//! item against a [`Scope`].
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

use crate::config::{ConditionDef, Contexts};
use crate::operand::{Operand, Scope};
use crate::value::{as_number, render};
use crate::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Skip reason used when a path operand resolves to nothing
pub const OPERAND_ABSENT: &str = "operand absent";

/// Closed set of condition operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Matches,
    Exists,
    NotExists,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    /// Look up an operator by its configuration name
    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name {
            "equals" => Self::Equals,
            "notEquals" => Self::NotEquals,
            "in" => Self::In,
            "notIn" => Self::NotIn,
            "matches" => Self::Matches,
            "exists" => Self::Exists,
            "notExists" => Self::NotExists,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            _ => return None,
        };
        Some(op)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::In => "in",
            Self::NotIn => "notIn",
            Self::Matches => "matches",
            Self::Exists => "exists",
            Self::NotExists => "notExists",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the left operand is checked against
#[derive(Debug, Clone)]
enum Check {
    Presence,
    Compare(Operand),
    Membership(Vec<String>),
    Pattern(Regex),
}

/// Result of evaluating a condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionOutcome {
    Passed,
    Failed(String),
}

impl ConditionOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Skip reason, when the condition failed
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Passed => None,
            Self::Failed(reason) => Some(reason),
        }
    }
}

/// A compiled condition
#[derive(Debug, Clone)]
pub struct Condition {
    op: Operator,
    left: Operand,
    check: Check,
    ignore_case: bool,
    description: String,
}

impl Condition {
    /// Compile a condition definition; `location` names it in error messages
    pub fn compile(def: &ConditionDef, contexts: &Contexts, location: &str) -> Result<Self> {
        let op = Operator::from_name(&def.op).ok_or_else(|| {
            Error::configuration(format!("{}.op", location), format!("unknown operator '{}'", def.op))
        })?;
        let left = Operand::compile(&def.left, contexts, &format!("{}.left", location))?;
        let right_location = format!("{}.right", location);

        let check = match op {
            Operator::Exists | Operator::NotExists => Check::Presence,
            Operator::In | Operator::NotIn => {
                let values = match (&def.values, &def.right) {
                    (Some(values), _) => values.clone(),
                    (None, Some(Value::Array(values))) => values.clone(),
                    _ => {
                        return Err(Error::configuration(
                            format!("{}.values", location),
                            format!("operator '{}' requires a list of values", op),
                        ))
                    }
                };
                Check::Membership(
                    values
                        .iter()
                        .map(|v| fold_case(render(v), def.ignore_case))
                        .collect(),
                )
            }
            Operator::Matches => {
                let pattern = match &def.right {
                    Some(Value::String(pattern)) => pattern,
                    _ => {
                        return Err(Error::configuration(
                            right_location,
                            "operator 'matches' requires a string pattern",
                        ))
                    }
                };
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(def.ignore_case)
                    .build()
                    .map_err(|e| Error::configuration(&right_location, format!("invalid regex: {}", e)))?;
                Check::Pattern(regex)
            }
            _ => {
                let right = def.right.as_ref().ok_or_else(|| {
                    Error::configuration(&right_location, format!("operator '{}' requires a right operand", op))
                })?;
                Check::Compare(Operand::compile(right, contexts, &right_location)?)
            }
        };

        let description = match &check {
            Check::Presence => format!("{}({})", op, left),
            Check::Compare(right) => format!("{}({}, {})", op, left, right),
            Check::Membership(values) => format!("{}({}, [{}])", op, left, values.join(", ")),
            Check::Pattern(regex) => format!("{}({}, /{}/)", op, left, regex.as_str()),
        };

        Ok(Self {
            op,
            left,
            check,
            ignore_case: def.ignore_case,
            description,
        })
    }

    pub fn operator(&self) -> Operator {
        self.op
    }

    /// Evaluate against a scope
    pub fn evaluate(&self, scope: &Scope<'_>) -> ConditionOutcome {
        let left = self.left.resolve(scope);

        let passed = match (&self.check, left) {
            (Check::Presence, left) => left.is_some() == (self.op == Operator::Exists),
            (_, None) => return ConditionOutcome::Failed(OPERAND_ABSENT.to_string()),
            (Check::Membership(values), Some(left)) => {
                let needle = fold_case(render(left), self.ignore_case);
                values.contains(&needle) == (self.op == Operator::In)
            }
            (Check::Pattern(regex), Some(left)) => regex.is_match(&render(left)),
            (Check::Compare(right), Some(left)) => {
                let Some(right) = right.resolve(scope) else {
                    return ConditionOutcome::Failed(OPERAND_ABSENT.to_string());
                };
                self.compare(left, right)
            }
        };

        if passed {
            ConditionOutcome::Passed
        } else {
            ConditionOutcome::Failed(format!("condition failed: {}", self.description))
        }
    }

    fn compare(&self, left: &Value, right: &Value) -> bool {
        let left_text = fold_case(render(left), self.ignore_case);
        let right_text = fold_case(render(right), self.ignore_case);

        match self.op {
            Operator::Equals => left_text == right_text,
            Operator::NotEquals => left_text != right_text,
            Operator::Gt => order(left, right, &left_text, &right_text) == Ordering::Greater,
            Operator::Gte => order(left, right, &left_text, &right_text) != Ordering::Less,
            Operator::Lt => order(left, right, &left_text, &right_text) == Ordering::Less,
            Operator::Lte => order(left, right, &left_text, &right_text) != Ordering::Greater,
            _ => false,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Evaluate an optional condition; a missing condition always passes
pub fn evaluate_optional(condition: Option<&Condition>, scope: &Scope<'_>) -> ConditionOutcome {
    condition.map_or(ConditionOutcome::Passed, |c| c.evaluate(scope))
}

/// Numeric ordering when both sides are numeric, lexicographic otherwise
fn order(left: &Value, right: &Value, left_text: &str, right_text: &str) -> Ordering {
    match (as_number(left), as_number(right)) {
        (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or_else(|| left_text.cmp(right_text)),
        _ => left_text.cmp(right_text),
    }
}

fn fold_case(text: String, ignore_case: bool) -> String {
    if ignore_case {
        text.to_lowercase()
    } else {
        text
    }
}
