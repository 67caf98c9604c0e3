//! Error types for collaborators.

use std::fmt;

use thiserror::Error;

/// What kind of entry a failed lookup was looking for.
///
/// The grant/revoke protocol uses this to decide whether a missing grantee
/// can be treated as an orphaned grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotFoundKind {
    Account,
    Group,
    Domain,
    Cos,
    /// Any other target entry (server, zimlet, ...).
    Target,
    Right,
}

impl NotFoundKind {
    /// Whether a grantee lookup failing with this kind means the grantee
    /// entry itself is gone.
    pub fn is_missing_grantee(&self) -> bool {
        matches!(
            self,
            NotFoundKind::Account | NotFoundKind::Group | NotFoundKind::Domain
        )
    }
}

impl fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotFoundKind::Account => "account",
            NotFoundKind::Group => "group",
            NotFoundKind::Domain => "domain",
            NotFoundKind::Cos => "cos",
            NotFoundKind::Target => "target",
            NotFoundKind::Right => "right",
        };
        f.write_str(s)
    }
}

/// Errors returned by the directory, catalog, evaluator and ACL store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Lookup failed.
    #[error("no such {kind}: {key}")]
    NotFound { kind: NotFoundKind, key: String },

    /// The evaluator refused (e.g. partial denial of the actor's own right).
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The collaborator cannot perform this operation.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(kind: NotFoundKind, key: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            key: key.into(),
        }
    }
}

/// Result type for collaborator operations.
pub type Result<T> = std::result::Result<T, StoreError>;
