//! # effright aggregate
//!
//! Grouping of effective rights across many targets.
//!
//! When an admin asks "what can this grantee do everywhere?", the answer is
//! folded per target type into:
//!
//! - rights on *all* entries of the type,
//! - rights on every entry within named domains (domained types only),
//! - rights on named entries, grouped so that entries with identical rights
//!   share one [`RightAggregation`].
//!
//! Identity of right profiles is decided by
//! [`RightsDigest`](effright_core::RightsDigest) equality.
//!
//! ## Usage
//!
//! ```rust
//! use effright_aggregate::AllEffectiveRights;
//! use effright_core::{EffectiveRights, TargetType};
//!
//! let mut all = AllEffectiveRights::new("usr", "u-1", "admin@example.com");
//! let er = EffectiveRights::builder(TargetType::Account, Some("a-1"), "a@example.com", "u-1", "admin@example.com")
//!     .preset_right("getAccount")
//!     .build();
//! all.add_entry(TargetType::Account, "a@example.com", er);
//!
//! assert_eq!(all.rights_by_target_type(TargetType::Account).entries().len(), 1);
//! ```

pub mod aggregation;
pub mod all;
pub mod error;

pub use aggregation::{RightAggregation, RightsByTargetType};
pub use all::AllEffectiveRights;
pub use error::{AggregateError, Result};
