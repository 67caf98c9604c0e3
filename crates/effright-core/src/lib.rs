//! # effright core
//!
//! The capability data model for the effective-rights engine: access
//! control entries, right definitions, and effective-rights snapshots with
//! their equivalence digest.
//!
//! This crate contains no I/O. Everything here is a value type that can be
//! handed across request boundaries without holding on to the directory or
//! the ACL store.
//!
//! ## Key Types
//!
//! - [`Ace`] / [`Acl`] - display-form access control entries, value-keyed
//! - [`Grant`] - the persisted form of an entry
//! - [`Right`] - a preset, attribute or combo right from the catalog
//! - [`EffectiveRights`] - what one grantee can do on one target
//! - [`RightsDigest`] - equivalence digest used for aggregation

pub mod ace;
pub mod digest;
pub mod effective;
pub mod error;
pub mod right;
pub mod types;

pub use ace::{Ace, Acl, Grant};
pub use digest::{AttrsDigest, NameListHash, RightsDigest};
pub use effective::{
    AttrMap, AttributeConstraint, EffectiveAttr, EffectiveRights, EffectiveRightsBuilder,
};
pub use error::{CoreError, Result};
pub use right::{AttrScope, Right, RightKind, CROSS_DOMAIN_ADMIN};
pub use types::{By, GranteeType, RightModifier, TargetType};
