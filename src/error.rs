//! Error types for built-in context access

use thiserror::Error;

use crate::result::Status;

/// Result type for engine setup (schema loading, configuration)
pub type Result<T> = std::result::Result<T, ContextError>;

/// Why a single get/set/delete call did not succeed.
///
/// Every variant maps to the HTTP-style status the caller sees in a
/// [`PathResult`](crate::PathResult).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("Path did not pass validation checks.")]
    InvalidFormat,

    /// A segment is missing while reading the full path
    #[error("The field {path} does not exist in this user's built-in object.")]
    NotFound { path: String },

    /// A segment is missing while looking up the container for a write
    #[error("The field {path} does not exist in this user's built-in object.")]
    AncestorNotFound { path: String },

    /// The walk had to descend from a scalar, array or null
    #[error("The field {path} is not an object in this user's built-in object.")]
    NotAContainer { path: String },

    #[error("The built-in context is not an object.")]
    RootNotAnObject,

    #[error("Built-in context property does not exist.")]
    LeafNotFound,

    /// The mutation was rolled back; errors come straight from the checker
    #[error("{}", .errors.join("; "))]
    SchemaViolation { errors: Vec<String> },
}

impl PathError {
    pub fn status(&self) -> Status {
        match self {
            PathError::AncestorNotFound { .. } | PathError::LeafNotFound => Status::NotFound,
            PathError::InvalidFormat
            | PathError::NotFound { .. }
            | PathError::NotAContainer { .. }
            | PathError::RootNotAnObject
            | PathError::SchemaViolation { .. } => Status::BadRequest,
        }
    }
}

/// Errors raised while building an engine
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("No schema configured (set [schema] path or CONTEXT__SCHEMA__PATH)")]
    MissingSchema,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
