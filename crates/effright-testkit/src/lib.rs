//! # effright testkit
//!
//! Testing utilities for the effright engine.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a populated in-memory directory and right catalog
//! - **Scripted evaluator**: a [`RuleEvaluator`](effright_store::RuleEvaluator)
//!   whose answers are set up by the test
//! - **Recording store**: an ACL store wrapper that logs every call
//! - **Generators**: proptest strategies for rights and entries
//!
//! ## Test Fixtures
//!
//! ```rust
//! use effright_testkit::fixtures::{TestFixture, DELEGATED_ADMIN_ID};
//!
//! let fixture = TestFixture::new();
//! fixture.evaluator.allow_delegation(DELEGATED_ADMIN_ID, "createAccount");
//! assert_eq!(fixture.store.call_count(), 0);
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use effright_testkit::generators::rights_profile;
//!
//! proptest! {
//!     #[test]
//!     fn digest_ignores_identity(p in rights_profile()) {
//!         let a = p.build(TargetType::Account, "a-1", "u-1");
//!         let b = p.build(TargetType::Domain, "d-1", "u-2");
//!         prop_assert!(a.has_same_rights(&b));
//!     }
//! }
//! ```

pub mod evaluator;
pub mod fixtures;
pub mod generators;
pub mod recording;

pub use evaluator::{Placement, RightsProfile, ScriptedEvaluator};
pub use fixtures::TestFixture;
pub use generators::{effective_rights, rights_profile};
pub use recording::{AclCall, RecordingAclStore};
