//! The materialized target document
//!
//! A flat, insertion-ordered mapping from full target field (`contact.email`,
//! `item_0.code`) to value. Re-writing a field replaces its value in place.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetDocument {
    fields: Map<String, Value>,
}

impl TargetDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a field; the last write wins and keeps the first position
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(field.into(), value)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// The document as a JSON object
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}
