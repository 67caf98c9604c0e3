//! Error types for the engine.

use effright_core::{CoreError, GranteeType, TargetType};
use effright_store::{NotFoundKind, StoreError};
use thiserror::Error;

/// Ways a request can be malformed or ineligible.
#[derive(Debug, Error)]
pub enum InvalidRequest {
    /// The right cannot be granted on this kind of target.
    #[error(
        "right {right} cannot be granted on a {target_type} entry. \
         It can only be granted on target types: {valid}"
    )]
    TargetTypeNotGrantable {
        right: String,
        target_type: TargetType,
        valid: String,
    },

    /// Admin rights need a delegated admin account or an admin group.
    #[error(
        "grantee {grantee} must be a delegated admin account or admin group, \
         it cannot be a global admin account"
    )]
    GranteeNotAdmin { grantee: String },

    /// The cross-domain admin right only goes to domains.
    #[error("grantee for right {right} must be a domain, not {grantee_type}")]
    CrossDomainNeedsDomainGrantee {
        right: String,
        grantee_type: GranteeType,
    },

    /// Only the cross-domain admin right goes to domains.
    #[error("right {right} cannot be granted to a domain")]
    DomainGranteeNotAllowed { right: String },

    /// An orphaned grant was addressed by grantee name.
    #[error(
        "cannot find grantee by name: {key}, \
         try revoke by grantee id if you want to remove the orphan grant"
    )]
    GranteeNameUnresolvable { key: String },

    /// Attribute values were supplied for a right that is not a set-attrs
    /// right.
    #[error("attr map is not allowed for checking a non-setAttrs right: {right}")]
    AttrsNotAllowed { right: String },

    /// Queries are answered for accounts only.
    #[error("grantee {key} is not an account")]
    NotAnAccount { key: String },

    /// Unknown type code or malformed right.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Ways the acting admin can be refused.
#[derive(Debug, Error)]
pub enum PermissionDenied {
    #[error("insufficient right to grant {right}")]
    Grant { right: String },

    #[error("insufficient right to revoke {right}")]
    Revoke { right: String },

    /// The actor holds the right only partially.
    #[error("{0}")]
    PartiallyDenied(String),
}

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A target, grantee, domain, cos or right does not exist.
    #[error("no such {kind}: {key}")]
    NotFound { kind: NotFoundKind, key: String },

    #[error("invalid request: {0}")]
    InvalidRequest(#[from] InvalidRequest),

    #[error("permission denied: {0}")]
    PermissionDenied(#[from] PermissionDenied),

    /// Revoke matched nothing on the target.
    #[error("no such grant: {0}")]
    NoSuchGrant(String),

    /// The collaborators cannot serve this engine.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A document could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// Any other collaborator failure.
    #[error("store error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { kind, key } => EngineError::NotFound { kind, key },
            StoreError::PermissionDenied(msg) => {
                EngineError::PermissionDenied(PermissionDenied::PartiallyDenied(msg))
            }
            other => EngineError::Store(other),
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(e: CoreError) -> Self {
        EngineError::InvalidRequest(InvalidRequest::Core(e))
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_classified() {
        let e: EngineError = StoreError::not_found(NotFoundKind::Account, "a@example.com").into();
        assert!(matches!(
            e,
            EngineError::NotFound {
                kind: NotFoundKind::Account,
                ..
            }
        ));

        let e: EngineError = StoreError::PermissionDenied("partial".into()).into();
        assert!(matches!(
            e,
            EngineError::PermissionDenied(PermissionDenied::PartiallyDenied(_))
        ));

        let e: EngineError = StoreError::Backend("down".into()).into();
        assert!(matches!(e, EngineError::Store(_)));
    }

    #[test]
    fn test_store_error_message_not_repeated() {
        use std::error::Error as _;

        let e: EngineError = StoreError::Backend("disk full".into()).into();
        assert!(!e.to_string().contains("disk full"));
        let source = e.source().expect("store error has a source");
        assert!(source.to_string().contains("disk full"));
    }

    #[test]
    fn test_target_type_message_lists_valid_types() {
        let e = InvalidRequest::TargetTypeNotGrantable {
            right: "renameAccount".into(),
            target_type: TargetType::Server,
            valid: "account,dl,domain".into(),
        };
        assert_eq!(
            e.to_string(),
            "right renameAccount cannot be granted on a server entry. \
             It can only be granted on target types: account,dl,domain"
        );
    }
}
