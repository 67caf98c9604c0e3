//! The right command: queries and grant/revoke over the collaborators.
//!
//! Every operation resolves its inputs through the [`Directory`] and
//! [`RightCatalog`], consults the [`RuleEvaluator`], and touches the
//! [`AclStore`] only after every check has passed.

use std::collections::BTreeMap;

use effright_aggregate::AllEffectiveRights;
use effright_core::{
    Acl, By, EffectiveRights, Grant, GranteeType, Right, RightModifier, TargetType,
};
use effright_store::{
    AclStore, AttrValues, Directory, GranteeEntry, RightCatalog, RuleEvaluator, StoreError,
    TargetEntry, ViaGrant,
};

use crate::config::EngineConfig;
use crate::error::{EngineError, InvalidRequest, PermissionDenied, Result};

/// How to find a target entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    pub target_type: TargetType,
    pub by: By,
    pub key: String,
}

impl TargetSpec {
    pub fn new(target_type: TargetType, by: By, key: impl Into<String>) -> Self {
        Self {
            target_type,
            by,
            key: key.into(),
        }
    }

    pub fn by_id(target_type: TargetType, id: impl Into<String>) -> Self {
        Self::new(target_type, By::Id, id)
    }

    pub fn by_name(target_type: TargetType, name: impl Into<String>) -> Self {
        Self::new(target_type, By::Name, name)
    }

    /// The global config or the global grant entry.
    pub fn singleton(target_type: TargetType) -> Self {
        Self::new(target_type, By::Name, target_type.code())
    }
}

/// How to find a grantee entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GranteeSpec {
    pub grantee_type: GranteeType,
    pub by: By,
    pub key: String,
}

impl GranteeSpec {
    pub fn new(grantee_type: GranteeType, by: By, key: impl Into<String>) -> Self {
        Self {
            grantee_type,
            by,
            key: key.into(),
        }
    }

    pub fn by_id(grantee_type: GranteeType, id: impl Into<String>) -> Self {
        Self::new(grantee_type, By::Id, id)
    }

    pub fn by_name(grantee_type: GranteeType, name: impl Into<String>) -> Self {
        Self::new(grantee_type, By::Name, name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Grant,
    Revoke,
}

/// The effective-rights engine.
///
/// Generic over its four collaborators so that tests can plug in scripted
/// ones. The engine itself holds no mutable state; every method is a
/// self-contained request.
pub struct RightCommand<D, C, E, S> {
    directory: D,
    catalog: C,
    evaluator: E,
    store: S,
    config: EngineConfig,
}

impl<D, C, E, S> RightCommand<D, C, E, S>
where
    D: Directory,
    C: RightCatalog,
    E: RuleEvaluator,
    S: AclStore,
{
    /// Create an engine.
    ///
    /// Fails with [`EngineError::Configuration`] when the evaluator cannot
    /// check delegated administration.
    pub fn new(
        directory: D,
        catalog: C,
        evaluator: E,
        store: S,
        config: EngineConfig,
    ) -> Result<Self> {
        if !evaluator.supports_delegation() {
            return Err(EngineError::Configuration(
                "the rule evaluator does not support delegated administration".into(),
            ));
        }
        Ok(Self {
            directory,
            catalog,
            evaluator,
            store,
            config,
        })
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────

    /// Look up one right by name.
    pub fn right(&self, name: &str) -> Result<Right> {
        Ok(self.catalog.right(name)?)
    }

    /// Admin rights, sorted by name.
    ///
    /// With a filter, only rights that can be *granted* on that target type
    /// are listed. That is not the same as rights executable on it:
    /// `renameAccount` can be granted on a domain.
    pub fn all_rights(&self, target_type: Option<TargetType>) -> Result<Vec<Right>> {
        let rights = self
            .catalog
            .all_rights()?
            .into_values()
            .filter(|r| !r.is_user_right())
            .filter(|r| target_type.map_or(true, |tt| r.grantable_on_target_type(tt)))
            .collect();
        Ok(rights)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    fn lookup_target(&self, spec: &TargetSpec) -> Result<TargetEntry> {
        Ok(self
            .directory
            .lookup_target(spec.target_type, spec.by, &spec.key)?)
    }

    fn lookup_account(&self, by: By, key: &str) -> Result<GranteeEntry> {
        let entry = self.directory.lookup_grantee(GranteeType::User, by, key)?;
        if entry.grantee_type != GranteeType::User {
            return Err(InvalidRequest::NotAnAccount { key: key.into() }.into());
        }
        Ok(entry)
    }

    fn evaluate(
        &self,
        target: &TargetEntry,
        grantee: &GranteeEntry,
        expand_set_attrs: bool,
        expand_get_attrs: bool,
    ) -> Result<EffectiveRights> {
        let mut builder = EffectiveRights::builder(
            target.target_type,
            target.id.as_deref(),
            target.name.as_str(),
            grantee.id.as_str(),
            grantee.name.as_str(),
        );
        self.evaluator.effective_rights(
            grantee,
            target,
            expand_set_attrs,
            expand_get_attrs,
            &mut builder,
        )?;
        Ok(builder.build())
    }

    /// What the account `grantee` can do on `target`.
    pub fn effective_rights(
        &self,
        target: &TargetSpec,
        grantee_by: By,
        grantee: &str,
        expand_set_attrs: bool,
        expand_get_attrs: bool,
    ) -> Result<EffectiveRights> {
        let target = self.lookup_target(target)?;
        let grantee = self.lookup_account(grantee_by, grantee)?;
        self.evaluate(&target, &grantee, expand_set_attrs, expand_get_attrs)
    }

    /// What the account `grantee` could set when creating an entry of
    /// `target_type`, optionally inside a domain and class of service.
    ///
    /// Attribute lists are always fully expanded.
    pub fn create_object_attrs(
        &self,
        target_type: TargetType,
        domain: Option<(By, &str)>,
        cos: Option<(By, &str)>,
        grantee_by: By,
        grantee: &str,
    ) -> Result<EffectiveRights> {
        let target = self.directory.pseudo_target(target_type, domain, cos)?;
        let grantee = self.lookup_account(grantee_by, grantee)?;
        self.evaluate(&target, &grantee, true, true)
    }

    /// Everything `grantee` can do, across all target types.
    pub fn all_effective_rights(
        &self,
        grantee: &GranteeSpec,
        expand_set_attrs: bool,
        expand_get_attrs: bool,
    ) -> Result<AllEffectiveRights> {
        let entry = self
            .directory
            .lookup_grantee(grantee.grantee_type, grantee.by, &grantee.key)?;
        let mut all = AllEffectiveRights::new(
            grantee.grantee_type.code(),
            entry.id.as_str(),
            entry.name.as_str(),
        );
        self.evaluator
            .all_effective_rights(&entry, expand_set_attrs, expand_get_attrs, &mut all)?;
        Ok(all)
    }

    /// Whether the account `grantee` can exercise `right` on `target`.
    ///
    /// Attribute values are accepted for set-attrs rights only. `via`
    /// receives the grant that decided the outcome, if the evaluator
    /// reports one.
    pub fn check_right(
        &self,
        target: &TargetSpec,
        grantee_by: By,
        grantee: &str,
        right: &str,
        attrs: Option<&AttrValues>,
        via: Option<&mut ViaGrant>,
    ) -> Result<bool> {
        let target = self.lookup_target(target)?;
        let grantee = self.lookup_account(grantee_by, grantee)?;
        let right = self.catalog.right(right)?;

        let has_attrs = attrs.is_some_and(|a| !a.is_empty());
        if has_attrs && !right.is_set_attrs_right() {
            return Err(InvalidRequest::AttrsNotAllowed {
                right: right.name().into(),
            }
            .into());
        }

        let allowed = self
            .evaluator
            .can_perform(&grantee, &target, &right, false, attrs, via)?;
        if !allowed {
            tracing::debug!(
                grantee = %grantee.name,
                target = %target.name,
                right = right.name(),
                "check right denied"
            );
        }
        Ok(allowed)
    }

    /// The grants on `target`, in display form.
    pub fn grants(&self, target: &TargetSpec) -> Result<Acl> {
        let target = self.lookup_target(target)?;
        let grants = self.store.grants(&target)?;

        let mut names = BTreeMap::new();
        if self.config.resolve_grantee_names {
            for g in &grants {
                let key = (g.grantee_type, g.grantee_id.clone());
                if names.contains_key(&key) {
                    continue;
                }
                match self
                    .directory
                    .lookup_grantee(g.grantee_type, By::Id, &g.grantee_id)
                {
                    Ok(entry) => {
                        names.insert(key, entry.name);
                    }
                    // Orphaned grant: shown by id.
                    Err(StoreError::NotFound { .. }) => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        Ok(Acl::from_grants(grants, |g| {
            names
                .get(&(g.grantee_type, g.grantee_id.clone()))
                .cloned()
                .unwrap_or_else(|| g.grantee_id.clone())
        }))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Grant / Revoke
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant `right` on `target` to `grantee`.
    ///
    /// `actor` is the admin performing the grant; `None` means a trusted
    /// system caller and skips the delegation check.
    pub fn grant_right(
        &self,
        actor: Option<&GranteeEntry>,
        target: &TargetSpec,
        grantee: &GranteeSpec,
        right: &str,
        modifier: Option<RightModifier>,
    ) -> Result<()> {
        let target = self.lookup_target(target)?;
        let entry = self
            .directory
            .lookup_grantee(grantee.grantee_type, grantee.by, &grantee.key)?;
        let right = self.catalog.right(right)?;

        self.verify(actor, &target, Some(&entry), &right, Mutation::Grant)?;

        let grant = Grant::new(grantee.grantee_type, entry.id, right.name(), modifier);
        self.store
            .add_grants(&target, std::slice::from_ref(&grant))?;

        tracing::info!(
            target_type = %target.target_type,
            target = %target.name,
            grant = %grant,
            "granted right"
        );
        Ok(())
    }

    /// Revoke `right` on `target` from `grantee`, returning the grants that
    /// were removed.
    ///
    /// A grantee that no longer exists can still be revoked from when
    /// addressed by id; the grant is then matched on the literal id.
    pub fn revoke_right(
        &self,
        actor: Option<&GranteeEntry>,
        target: &TargetSpec,
        grantee: &GranteeSpec,
        right: &str,
        modifier: Option<RightModifier>,
    ) -> Result<Vec<Grant>> {
        let target = self.lookup_target(target)?;

        let (entry, grantee_id) =
            match self
                .directory
                .lookup_grantee(grantee.grantee_type, grantee.by, &grantee.key)
            {
                Ok(entry) => {
                    let id = entry.id.clone();
                    (Some(entry), id)
                }
                Err(StoreError::NotFound { kind, key })
                    if kind.is_missing_grantee() && self.config.orphan_revoke =>
                {
                    tracing::warn!(grantee = %key, kind = %kind, "revoke: no such grantee");
                    match grantee.by {
                        By::Id => (None, grantee.key.clone()),
                        By::Name => {
                            return Err(InvalidRequest::GranteeNameUnresolvable { key }.into())
                        }
                    }
                }
                Err(e) => return Err(e.into()),
            };

        let right = self.catalog.right(right)?;
        self.verify(actor, &target, entry.as_ref(), &right, Mutation::Revoke)?;

        let grant = Grant::new(grantee.grantee_type, grantee_id, right.name(), modifier);
        let removed = self
            .store
            .remove_grants(&target, std::slice::from_ref(&grant))?;
        if removed.is_empty() {
            return Err(EngineError::NoSuchGrant(grant.to_string()));
        }

        tracing::info!(
            target_type = %target.target_type,
            target = %target.name,
            grant = %grant,
            "revoked right"
        );
        Ok(removed)
    }

    /// Checks run before any grant or revoke is persisted.
    ///
    /// `grantee` is `None` for an orphaned grant, which skips grantee
    /// eligibility and the delegation check.
    fn verify(
        &self,
        actor: Option<&GranteeEntry>,
        target: &TargetEntry,
        grantee: Option<&GranteeEntry>,
        right: &Right,
        mutation: Mutation,
    ) -> Result<()> {
        if !right.is_user_right() {
            // A grantee may have lost admin standing since the grant was
            // made; revoking must still go through.
            if let (Mutation::Grant, Some(grantee)) = (mutation, grantee) {
                check_grantee_eligibility(right, grantee)?;
            }
            check_target_type(right, target.target_type)?;
        }

        let (Some(actor), Some(_)) = (actor, grantee) else {
            return Ok(());
        };

        // An admin can only hand out, in whole or in part, what it holds
        // itself with delegation permission.
        if !self
            .evaluator
            .can_perform(actor, target, right, true, None, None)?
        {
            tracing::debug!(actor = %actor.name, right = right.name(), "delegation denied");
            let right = right.name().to_string();
            return Err(match mutation {
                Mutation::Grant => PermissionDenied::Grant { right },
                Mutation::Revoke => PermissionDenied::Revoke { right },
            }
            .into());
        }

        self.evaluator
            .check_partially_denied(actor, target.target_type, target, right)?;
        Ok(())
    }
}

/// The cross-domain admin right goes to domains only, and domains receive
/// no other admin right. Returns whether `right` is the cross-domain admin
/// right.
fn validate_cross_domain_grant(right: &Right, grantee_type: GranteeType) -> Result<bool> {
    if right.is_cross_domain_admin() {
        if grantee_type != GranteeType::Domain {
            return Err(InvalidRequest::CrossDomainNeedsDomainGrantee {
                right: right.name().into(),
                grantee_type,
            }
            .into());
        }
        return Ok(true);
    }
    if grantee_type == GranteeType::Domain {
        return Err(InvalidRequest::DomainGranteeNotAllowed {
            right: right.name().into(),
        }
        .into());
    }
    Ok(false)
}

fn check_grantee_eligibility(right: &Right, grantee: &GranteeEntry) -> Result<()> {
    let cross_domain = validate_cross_domain_grant(right, grantee.grantee_type)?;
    if !cross_domain && !grantee.is_valid_for_admin_rights() {
        return Err(InvalidRequest::GranteeNotAdmin {
            grantee: grantee.name.clone(),
        }
        .into());
    }
    Ok(())
}

fn check_target_type(right: &Right, target_type: TargetType) -> Result<()> {
    if !right.grantable_on_target_type(target_type) {
        return Err(InvalidRequest::TargetTypeNotGrantable {
            right: right.name().into(),
            target_type,
            valid: right.report_grantable_target_types(),
        }
        .into());
    }
    Ok(())
}
