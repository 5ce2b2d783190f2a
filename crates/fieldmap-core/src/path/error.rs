//! Error types for path expressions
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Errors raised while parsing a path expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Structural problems such as unbalanced brackets
    #[error("Syntax error at position {position} in '{input}': {message}")]
    Syntax {
        message: String,
        position: usize,
        input: String,
    },

    /// Bracket contents that are not a non-negative integer
    #[error("Invalid index '{index}' at position {position} in '{input}'")]
    InvalidIndex {
        index: String,
        position: usize,
        input: String,
    },
}

impl PathError {
    /// Create a syntax error at the given position
    pub fn syntax(message: impl Into<String>, position: usize, input: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
            input: input.into(),
        }
    }

    /// Create an invalid index error
    pub fn invalid_index(index: impl Into<String>, position: usize, input: impl Into<String>) -> Self {
        Self::InvalidIndex {
            index: index.into(),
            position,
            input: input.into(),
        }
    }

    /// Character offset of the error in the input
    pub fn position(&self) -> usize {
        match self {
            Self::Syntax { position, .. } | Self::InvalidIndex { position, .. } => *position,
        }
    }

    /// The expression that failed to parse
    pub fn input(&self) -> &str {
        match self {
            Self::Syntax { input, .. } | Self::InvalidIndex { input, .. } => input,
        }
    }
}
