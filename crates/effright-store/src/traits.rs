//! Collaborator traits: the abstract interfaces the engine consumes.
//!
//! The engine never talks to LDAP, a rules engine or a database directly.
//! It resolves entries through a [`Directory`], looks up rights in a
//! [`RightCatalog`], asks a [`RuleEvaluator`] whether a right is actually
//! held, and persists grants through an [`AclStore`].
//!
//! All methods are synchronous and may block on I/O. Implementations own
//! their synchronization; the engine holds no locks.

use std::collections::BTreeMap;

use effright_aggregate::AllEffectiveRights;
use effright_core::{By, EffectiveRightsBuilder, Grant, GranteeType, Right, TargetType};

use crate::error::Result;

/// A resolved target entry.
///
/// A detached copy: it stays valid after the directory changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntry {
    pub target_type: TargetType,
    /// Directory id; `None` for singleton targets and pseudo-targets.
    pub id: Option<String>,
    /// Display label.
    pub name: String,
    /// Owning domain name, for domained target types.
    pub domain: Option<String>,
}

impl TargetEntry {
    pub fn new(target_type: TargetType, id: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            target_type,
            id: id.map(String::from),
            name: name.into(),
            domain: None,
        }
    }

    pub fn in_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Key under which grants on this target are stored.
    pub fn acl_key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}

/// Administrative standing of a grantee entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminStatus {
    #[default]
    None,
    /// An account flagged as a delegated admin.
    DelegatedAdmin,
    /// An account with unrestricted admin rights.
    GlobalAdmin,
    /// A group flagged as an admin group.
    AdminGroup,
}

/// A resolved grantee entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GranteeEntry {
    pub grantee_type: GranteeType,
    pub id: String,
    pub name: String,
    pub admin: AdminStatus,
}

impl GranteeEntry {
    pub fn new(grantee_type: GranteeType, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            grantee_type,
            id: id.into(),
            name: name.into(),
            admin: AdminStatus::None,
        }
    }

    pub fn with_admin(mut self, admin: AdminStatus) -> Self {
        self.admin = admin;
        self
    }

    /// Whether admin rights can be granted to this entry.
    ///
    /// Only delegated admin accounts and admin groups qualify; a global
    /// admin already holds everything and must not receive grants.
    pub fn is_valid_for_admin_rights(&self) -> bool {
        match self.grantee_type {
            GranteeType::User => self.admin == AdminStatus::DelegatedAdmin,
            GranteeType::Group => self.admin == AdminStatus::AdminGroup,
            _ => false,
        }
    }
}

/// Attribute values supplied with a set-attrs check.
pub type AttrValues = BTreeMap<String, Vec<String>>;

/// Which grant decided the outcome of a right check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViaGrant {
    pub target_type: TargetType,
    pub target_name: String,
    pub grantee_type: GranteeType,
    pub grantee_name: String,
    pub right: String,
    pub is_negative: bool,
}

/// Immutable right definitions.
pub trait RightCatalog: Send + Sync {
    /// Look up one right. Missing rights are `NotFound` with kind `Right`.
    fn right(&self, name: &str) -> Result<Right>;

    /// Every right, keyed by name.
    fn all_rights(&self) -> Result<BTreeMap<String, Right>>;
}

/// Identity/directory lookup.
pub trait Directory: Send + Sync {
    /// Resolve a target entry. Singleton types (config, global) ignore
    /// `by` and `key`.
    fn lookup_target(&self, target_type: TargetType, by: By, key: &str) -> Result<TargetEntry>;

    /// Resolve a grantee entry. Failures are classified by
    /// [`NotFoundKind`](crate::NotFoundKind) so that orphaned grants can be
    /// told apart from other errors.
    fn lookup_grantee(&self, grantee_type: GranteeType, by: By, key: &str)
        -> Result<GranteeEntry>;

    /// Build a stand-in for an entry that does not exist yet, used to
    /// preview the attributes an admin could set at creation time.
    fn pseudo_target(
        &self,
        target_type: TargetType,
        domain: Option<(By, &str)>,
        cos: Option<(By, &str)>,
    ) -> Result<TargetEntry>;
}

/// The rule evaluator that decides whether rights are actually held.
pub trait RuleEvaluator: Send + Sync {
    /// Whether this evaluator implements delegated-admin checks at all.
    fn supports_delegation(&self) -> bool;

    /// Can `actor` exercise `right` on `target`?
    ///
    /// With `for_grant` the actor must hold the right in grantable mode
    /// (with delegation permission). `via`, when supplied, receives the
    /// grant that decided the outcome.
    fn can_perform(
        &self,
        actor: &GranteeEntry,
        target: &TargetEntry,
        right: &Right,
        for_grant: bool,
        attrs: Option<&AttrValues>,
        via: Option<&mut ViaGrant>,
    ) -> Result<bool>;

    /// Fill `out` with everything `grantee` can do on `target`.
    ///
    /// The expand flags ask for the full attribute list to be enumerated
    /// when an "all attributes" right is present.
    fn effective_rights(
        &self,
        grantee: &GranteeEntry,
        target: &TargetEntry,
        expand_set_attrs: bool,
        expand_get_attrs: bool,
        out: &mut EffectiveRightsBuilder,
    ) -> Result<()>;

    /// Fill `out` with the grantee's rights on every target type.
    fn all_effective_rights(
        &self,
        grantee: &GranteeEntry,
        expand_set_attrs: bool,
        expand_get_attrs: bool,
        out: &mut AllEffectiveRights,
    ) -> Result<()>;

    /// Fails with `PermissionDenied` when the actor's own hold on `right`
    /// is partially denied in a way that would let it delegate more than
    /// it holds.
    fn check_partially_denied(
        &self,
        actor: &GranteeEntry,
        target_type: TargetType,
        target: &TargetEntry,
        right: &Right,
    ) -> Result<()>;
}

/// Persisted grant storage.
pub trait AclStore: Send + Sync {
    /// Grants currently attached to a target.
    fn grants(&self, target: &TargetEntry) -> Result<Vec<Grant>>;

    /// Attach grants. Already-present grants are left as they are.
    fn add_grants(&self, target: &TargetEntry, grants: &[Grant]) -> Result<()>;

    /// Detach grants, returning those that were actually present.
    fn remove_grants(&self, target: &TargetEntry, grants: &[Grant]) -> Result<Vec<Grant>>;
}

impl<T: RightCatalog + ?Sized> RightCatalog for std::sync::Arc<T> {
    fn right(&self, name: &str) -> Result<Right> {
        (**self).right(name)
    }

    fn all_rights(&self) -> Result<BTreeMap<String, Right>> {
        (**self).all_rights()
    }
}

impl<T: Directory + ?Sized> Directory for std::sync::Arc<T> {
    fn lookup_target(&self, target_type: TargetType, by: By, key: &str) -> Result<TargetEntry> {
        (**self).lookup_target(target_type, by, key)
    }

    fn lookup_grantee(
        &self,
        grantee_type: GranteeType,
        by: By,
        key: &str,
    ) -> Result<GranteeEntry> {
        (**self).lookup_grantee(grantee_type, by, key)
    }

    fn pseudo_target(
        &self,
        target_type: TargetType,
        domain: Option<(By, &str)>,
        cos: Option<(By, &str)>,
    ) -> Result<TargetEntry> {
        (**self).pseudo_target(target_type, domain, cos)
    }
}

impl<T: AclStore + ?Sized> AclStore for std::sync::Arc<T> {
    fn grants(&self, target: &TargetEntry) -> Result<Vec<Grant>> {
        (**self).grants(target)
    }

    fn add_grants(&self, target: &TargetEntry, grants: &[Grant]) -> Result<()> {
        (**self).add_grants(target, grants)
    }

    fn remove_grants(&self, target: &TargetEntry, grants: &[Grant]) -> Result<Vec<Grant>> {
        (**self).remove_grants(target, grants)
    }
}

impl<T: RuleEvaluator + ?Sized> RuleEvaluator for std::sync::Arc<T> {
    fn supports_delegation(&self) -> bool {
        (**self).supports_delegation()
    }

    fn can_perform(
        &self,
        actor: &GranteeEntry,
        target: &TargetEntry,
        right: &Right,
        for_grant: bool,
        attrs: Option<&AttrValues>,
        via: Option<&mut ViaGrant>,
    ) -> Result<bool> {
        (**self).can_perform(actor, target, right, for_grant, attrs, via)
    }

    fn effective_rights(
        &self,
        grantee: &GranteeEntry,
        target: &TargetEntry,
        expand_set_attrs: bool,
        expand_get_attrs: bool,
        out: &mut EffectiveRightsBuilder,
    ) -> Result<()> {
        (**self).effective_rights(grantee, target, expand_set_attrs, expand_get_attrs, out)
    }

    fn all_effective_rights(
        &self,
        grantee: &GranteeEntry,
        expand_set_attrs: bool,
        expand_get_attrs: bool,
        out: &mut AllEffectiveRights,
    ) -> Result<()> {
        (**self).all_effective_rights(grantee, expand_set_attrs, expand_get_attrs, out)
    }

    fn check_partially_denied(
        &self,
        actor: &GranteeEntry,
        target_type: TargetType,
        target: &TargetEntry,
        right: &Right,
    ) -> Result<()> {
        (**self).check_partially_denied(actor, target_type, target, right)
    }
}
