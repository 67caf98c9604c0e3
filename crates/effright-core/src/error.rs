//! Error types for the capability model.

use thiserror::Error;

/// Errors raised while parsing or constructing capability values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown target type: {0}")]
    UnknownTargetType(String),

    #[error("unknown grantee type: {0}")]
    UnknownGranteeType(String),

    #[error("unknown addressing mode: {0}")]
    UnknownBy(String),

    #[error("unknown right type: {0}")]
    UnknownRightType(String),

    #[error("malformed right {name}: {reason}")]
    MalformedRight { name: String, reason: String },
}

/// Result type for capability model operations.
pub type Result<T> = std::result::Result<T, CoreError>;
