//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors cover schema construction and extraction failures.
/// Every extraction failure aborts the whole top-level call.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid schema at '{location}': {reason}")]
    Schema { location: String, reason: String },

    #[error("cannot resolve path '{path}': {reason}")]
    Accessor { path: String, reason: String },

    #[error("preload of relation '{relation}' failed: {reason}")]
    Preload { relation: String, reason: String },

    #[error("capability '{name}' failed: {message}")]
    Capability { name: String, message: String },
}

impl DomainError {
    /// Create a schema shape error.
    pub fn schema(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Create a record accessor error.
    pub fn accessor(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Accessor {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a preload error.
    pub fn preload(relation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Preload {
            relation: relation.into(),
            reason: reason.into(),
        }
    }

    /// Create an error raised by a getter or predicate.
    pub fn capability(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Capability {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
