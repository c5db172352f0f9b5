//! Custom error types for kinship.
//!
//! Every fallible operation in the crate returns [`KinshipResult`]. Store
//! failures are fatal for the current run and are never retried here.

use std::path::PathBuf;

/// The main error type for kinship operations.
#[derive(Debug, thiserror::Error)]
pub enum KinshipError {
    /// I/O error (snapshot read, report write, etc.)
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// Regex compilation error
    #[error("Invalid regex pattern '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rejected configuration value
    #[error("Invalid configuration for '{field}': {message}")]
    Config { field: String, message: String },

    /// Malformed incident query
    #[error("Invalid query '{query}': {message}")]
    Query { query: String, message: String },

    /// Backing store failure
    #[error("Store operation '{operation}' failed: {message}")]
    Store { operation: String, message: String },

    /// A vocabulary indicator has no weight
    #[error("No weight computed for vocabulary indicator '{0}'")]
    MissingWeight(String),

    /// Thread pool initialization error
    #[error("Failed to initialize thread pool: {0}")]
    ThreadPool(String),
}

/// Result type alias using KinshipError
pub type KinshipResult<T> = Result<T, KinshipError>;

impl KinshipError {
    /// Create an I/O error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a regex error with pattern context
    pub fn regex(source: regex::Error, pattern: impl Into<String>) -> Self {
        Self::Regex {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a configuration error for a named field
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a query error
    pub fn query(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query {
            query: query.into(),
            message: message.into(),
        }
    }

    /// Create a store error with operation context
    pub fn store(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Convert from raw I/O errors (without path context)
impl From<std::io::Error> for KinshipError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { path: None, source }
    }
}
