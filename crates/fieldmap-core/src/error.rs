//! Error types for the Fieldmap core library
//!
//! Only fatal problems surface through [`Error`]: a configuration that cannot
//! be compiled, or a resource that cannot be loaded. Problems scoped to a single
//! mapping rule never become an `Error`; they are recorded in the dry-run report.

use crate::path::PathError;
use thiserror::Error;

/// Main error type for Fieldmap operations
#[derive(Error, Debug)]
pub enum Error {
    /// Structurally invalid mapping configuration
    #[error("Configuration error at {location}: {message}")]
    Configuration {
        location: String,
        message: String,
    },

    /// Malformed path expression outside of a configuration
    #[error("Path error: {0}")]
    Path(#[from] PathError),

    /// A configuration or data reference could not be loaded
    #[error("Resource error: {reference} - {message}")]
    Resource {
        reference: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parsing errors
    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error at the given location
    pub fn configuration(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create a resource error without an underlying cause
    pub fn resource(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resource {
            reference: reference.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Whether this error was raised while compiling a configuration
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Path(_))
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
