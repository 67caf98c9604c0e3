//! Error types for the aggregation engine.

use effright_core::TargetType;
use thiserror::Error;

/// Errors that can occur while aggregating effective rights.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Domain aggregation requested for a target type whose entries do not
    /// belong to domains.
    #[error("target type {0} cannot be aggregated by domain")]
    NotDomained(TargetType),
}

/// Result type for aggregation operations.
pub type Result<T> = std::result::Result<T, AggregateError>;
