//! Test fixtures and helpers.
//!
//! A small directory with two domains, a handful of admins and a catalog
//! of rights covering every right shape.

use std::collections::BTreeSet;
use std::sync::Arc;

use effright_core::{AttrScope, GranteeType, Right, RightKind, TargetType, CROSS_DOMAIN_ADMIN};
use effright_store::{
    AdminStatus, GranteeEntry, MemoryAclStore, MemoryCatalog, MemoryDirectory, TargetEntry,
};

use crate::evaluator::ScriptedEvaluator;
use crate::recording::RecordingAclStore;

pub const DOMAIN: &str = "example.com";
pub const DOMAIN_ID: &str = "d-example";
pub const OTHER_DOMAIN: &str = "other.com";
pub const OTHER_DOMAIN_ID: &str = "d-other";

pub const DELEGATED_ADMIN: &str = "da@example.com";
pub const DELEGATED_ADMIN_ID: &str = "u-da";
pub const GLOBAL_ADMIN: &str = "admin@example.com";
pub const GLOBAL_ADMIN_ID: &str = "u-admin";
pub const USER: &str = "user@example.com";
pub const USER_ID: &str = "u-user";
pub const ADMIN_GROUP: &str = "admins@example.com";
pub const ADMIN_GROUP_ID: &str = "g-admins";

pub const SERVER: &str = "mail.example.com";
pub const SERVER_ID: &str = "s-mail";
pub const COS: &str = "default";
pub const COS_ID: &str = "c-default";

/// Attributes an "all attributes" right expands to.
pub const ACCOUNT_ATTRS: [&str; 4] = ["cn", "displayName", "sn", "zimbraMailQuota"];

fn right(name: &str, desc: &str, kind: RightKind, targets: &[TargetType]) -> Right {
    Right::new(name, desc, kind, targets.iter().copied()).expect("fixture right is well formed")
}

fn attr_set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Rights in the fixture catalog.
pub fn sample_rights() -> Vec<Right> {
    use TargetType::*;
    vec![
        right("createAccount", "create an account", RightKind::Preset, &[Domain]),
        right(
            "renameAccount",
            "rename an account",
            RightKind::Preset,
            &[Account, DistributionList, Domain],
        ),
        right(
            "deleteAccount",
            "delete an account",
            RightKind::Preset,
            &[Account, DistributionList, Domain],
        ),
        right(
            "modifyAccountQuota",
            "set quota attributes",
            RightKind::SetAttrs(AttrScope::Listed(attr_set(&["zimbraMailQuota"]))),
            &[Account, DistributionList, Domain],
        ),
        right(
            "getAccount",
            "read every account attribute",
            RightKind::GetAttrs(AttrScope::All {
                expanded: attr_set(&ACCOUNT_ATTRS),
            }),
            &[Account, DistributionList, Domain],
        ),
        right(
            "domainAdminAccountRights",
            "account rights of a domain admin",
            RightKind::Combo(vec!["createAccount".into(), "deleteAccount".into()]),
            &[Domain],
        ),
        right(
            "listServer",
            "list servers",
            RightKind::Preset,
            &[Server, Global],
        ),
        right(
            CROSS_DOMAIN_ADMIN,
            "administer another domain",
            RightKind::Preset,
            &[Domain],
        ),
        right(
            "viewFreeBusy",
            "see free/busy",
            RightKind::Preset,
            &[Account],
        )
        .into_user_right(),
    ]
}

/// A test fixture: populated directory and catalog, scripted evaluator,
/// recording in-memory ACL store.
///
/// Fields are `Arc`s so that an engine can share them with the test.
pub struct TestFixture {
    pub directory: Arc<MemoryDirectory>,
    pub catalog: Arc<MemoryCatalog>,
    pub evaluator: Arc<ScriptedEvaluator>,
    pub store: Arc<RecordingAclStore<MemoryAclStore>>,
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_evaluator(ScriptedEvaluator::new())
    }

    pub fn with_evaluator(evaluator: ScriptedEvaluator) -> Self {
        let fixture = Self {
            directory: Arc::new(MemoryDirectory::new()),
            catalog: Arc::new(MemoryCatalog::with_rights(sample_rights())),
            evaluator: Arc::new(evaluator),
            store: Arc::new(RecordingAclStore::new(MemoryAclStore::new())),
        };
        fixture.populate();
        fixture
    }

    fn populate(&self) {
        let dir = &self.directory;

        dir.add_target(TargetEntry::new(TargetType::Domain, Some(DOMAIN_ID), DOMAIN));
        dir.add_target(TargetEntry::new(
            TargetType::Domain,
            Some(OTHER_DOMAIN_ID),
            OTHER_DOMAIN,
        ));
        dir.add_target(TargetEntry::new(TargetType::Server, Some(SERVER_ID), SERVER));
        dir.add_target(TargetEntry::new(TargetType::Cos, Some(COS_ID), COS));
        for (id, name) in [
            (DELEGATED_ADMIN_ID, DELEGATED_ADMIN),
            (GLOBAL_ADMIN_ID, GLOBAL_ADMIN),
            (USER_ID, USER),
        ] {
            dir.add_target(TargetEntry::new(TargetType::Account, Some(id), name).in_domain(DOMAIN));
        }
        dir.add_target(
            TargetEntry::new(TargetType::DistributionList, Some(ADMIN_GROUP_ID), ADMIN_GROUP)
                .in_domain(DOMAIN),
        );

        dir.add_grantee(self.delegated_admin());
        dir.add_grantee(self.global_admin());
        dir.add_grantee(GranteeEntry::new(GranteeType::User, USER_ID, USER));
        dir.add_grantee(
            GranteeEntry::new(GranteeType::Group, ADMIN_GROUP_ID, ADMIN_GROUP)
                .with_admin(AdminStatus::AdminGroup),
        );
        dir.add_grantee(GranteeEntry::new(
            GranteeType::Domain,
            OTHER_DOMAIN_ID,
            OTHER_DOMAIN,
        ));
    }

    pub fn delegated_admin(&self) -> GranteeEntry {
        GranteeEntry::new(GranteeType::User, DELEGATED_ADMIN_ID, DELEGATED_ADMIN)
            .with_admin(AdminStatus::DelegatedAdmin)
    }

    pub fn global_admin(&self) -> GranteeEntry {
        GranteeEntry::new(GranteeType::User, GLOBAL_ADMIN_ID, GLOBAL_ADMIN)
            .with_admin(AdminStatus::GlobalAdmin)
    }

    /// Add a delegated admin account (as both grantee and target).
    pub fn add_delegated_admin(&self, id: &str, name: &str) -> GranteeEntry {
        let entry =
            GranteeEntry::new(GranteeType::User, id, name).with_admin(AdminStatus::DelegatedAdmin);
        self.directory.add_grantee(entry.clone());
        self.directory
            .add_target(TargetEntry::new(TargetType::Account, Some(id), name).in_domain(DOMAIN));
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use effright_core::By;
    use effright_store::{Directory, RightCatalog};

    #[test]
    fn test_fixture_resolves_entries() {
        let f = TestFixture::new();
        let da = f
            .directory
            .lookup_grantee(GranteeType::User, By::Name, DELEGATED_ADMIN)
            .unwrap();
        assert!(da.is_valid_for_admin_rights());

        let domain = f
            .directory
            .lookup_target(TargetType::Domain, By::Name, DOMAIN)
            .unwrap();
        assert_eq!(domain.id.as_deref(), Some(DOMAIN_ID));

        assert!(f.catalog.right("viewFreeBusy").unwrap().is_user_right());
        assert!(f.catalog.right(CROSS_DOMAIN_ADMIN).unwrap().is_cross_domain_admin());
    }
}
