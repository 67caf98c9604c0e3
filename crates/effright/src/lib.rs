//! # effright
//!
//! An effective-rights engine for delegated administration: who may do
//! what on which directory entry, and who may hand those rights on.
//!
//! ## Overview
//!
//! - **Grants**: an admin grants a right on a target (an account, a
//!   domain, the global config, ...) to a grantee (an admin account, an
//!   admin group, a domain). Grants can be negative (deny) or delegable.
//! - **Effective rights**: what a grantee can actually do on a target once
//!   every grant, group membership and denial has been weighed.
//! - **Aggregation**: the answer to "what can this grantee do everywhere?",
//!   with targets that share identical rights grouped together.
//!
//! The engine owns none of the data. It talks to a directory, a right
//! catalog, a rule evaluator and an ACL store through the traits in
//! [`store`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use effright::{EngineConfig, GranteeSpec, RightCommand, TargetSpec};
//! use effright::core::{GranteeType, TargetType};
//! # use effright::store::{MemoryAclStore, MemoryCatalog, MemoryDirectory, RuleEvaluator};
//! # fn example<E: RuleEvaluator>(evaluator: E) -> effright::Result<()> {
//! let engine = RightCommand::new(
//!     MemoryDirectory::new(),
//!     MemoryCatalog::new(),
//!     evaluator,
//!     MemoryAclStore::new(),
//!     EngineConfig::default(),
//! )?;
//!
//! engine.grant_right(
//!     None,
//!     &TargetSpec::by_name(TargetType::Domain, "example.com"),
//!     &GranteeSpec::by_name(GranteeType::User, "da@example.com"),
//!     "createAccount",
//!     None,
//! )?;
//!
//! let acl = engine.grants(&TargetSpec::by_name(TargetType::Domain, "example.com"))?;
//! assert_eq!(acl.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Re-exports
//!
//! - `effright::core` - capability model (ACEs, rights, effective rights)
//! - `effright::store` - collaborator traits, in-memory and SQLite stores
//! - `effright::aggregate` - cross-target aggregation

pub mod codec;
pub mod command;
pub mod config;
pub mod error;

pub use effright_aggregate as aggregate;
pub use effright_core as core;
pub use effright_store as store;

pub use codec::{
    AclDocument, AttrDocument, AttrsDocument, ConstraintDocument, CreateObjectAttrsDocument,
    Document, EffectiveRightsDocument, GrantDocument, GranteeDocument, RightDocument,
    TargetDocument,
};
pub use command::{GranteeSpec, RightCommand, TargetSpec};
pub use config::EngineConfig;
pub use error::{EngineError, InvalidRequest, PermissionDenied, Result};

pub use effright_aggregate::{AllEffectiveRights, RightAggregation, RightsByTargetType};
pub use effright_core::{
    Ace, Acl, By, EffectiveAttr, EffectiveRights, Grant, GranteeType, Right, RightKind,
    RightModifier, TargetType,
};
