//! # effright store
//!
//! Collaborator contracts for the effective-rights engine, plus in-memory
//! and SQLite implementations.
//!
//! ## Overview
//!
//! The engine is storage-agnostic. It consumes four traits:
//!
//! - [`RightCatalog`] - immutable right definitions
//! - [`Directory`] - target and grantee resolution, classified failures
//! - [`RuleEvaluator`] - whether a right is actually held; effective rights
//! - [`AclStore`] - persisted grants per target
//!
//! [`MemoryCatalog`], [`MemoryDirectory`] and [`MemoryAclStore`] keep
//! everything in memory. [`SqliteAclStore`] persists grants with rusqlite.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use effright_core::{Grant, GranteeType, TargetType};
//! use effright_store::{AclStore, SqliteAclStore, TargetEntry};
//!
//! let store = SqliteAclStore::open("acl.db").unwrap();
//! let domain = TargetEntry::new(TargetType::Domain, Some("d-1"), "example.com");
//! let grant = Grant::new(GranteeType::User, "u-1", "createAccount", None);
//! store.add_grants(&domain, &[grant]).unwrap();
//! ```

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{NotFoundKind, Result, StoreError};
pub use memory::{MemoryAclStore, MemoryCatalog, MemoryDirectory};
pub use sqlite::SqliteAclStore;
pub use traits::{
    AclStore, AdminStatus, AttrValues, Directory, GranteeEntry, RightCatalog, RuleEvaluator,
    TargetEntry, ViaGrant,
};
