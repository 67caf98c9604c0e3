//! A rule evaluator scripted by the test.
//!
//! Nothing is inferred from grants: every answer the evaluator gives was
//! put there by the test, keyed by grantee id.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use effright_aggregate::AllEffectiveRights;
use effright_core::{EffectiveAttr, EffectiveRights, EffectiveRightsBuilder, Right, TargetType};
use effright_store::{
    AttrValues, GranteeEntry, Result, RuleEvaluator, StoreError, TargetEntry, ViaGrant,
};

/// The rights a scripted evaluator reports for one target.
#[derive(Debug, Clone, Default)]
pub struct RightsProfile {
    pub preset: Vec<String>,
    pub set_all: bool,
    pub set_attrs: Vec<EffectiveAttr>,
    pub get_all: bool,
    pub get_attrs: Vec<EffectiveAttr>,
    /// Reported for "all attributes" rights when expansion is requested.
    pub all_attrs: Vec<String>,
}

impl RightsProfile {
    pub fn preset(rights: &[&str]) -> Self {
        Self {
            preset: rights.iter().map(|r| r.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn settable(mut self, attrs: &[&str]) -> Self {
        self.set_attrs
            .extend(attrs.iter().map(|a| EffectiveAttr::new(*a)));
        self
    }

    pub fn gettable(mut self, attrs: &[&str]) -> Self {
        self.get_attrs
            .extend(attrs.iter().map(|a| EffectiveAttr::new(*a)));
        self
    }

    pub fn set_all(mut self) -> Self {
        self.set_all = true;
        self
    }

    pub fn get_all(mut self) -> Self {
        self.get_all = true;
        self
    }

    pub fn expanding(mut self, all_attrs: &[&str]) -> Self {
        self.all_attrs = all_attrs.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn apply(&self, out: &mut EffectiveRightsBuilder, expand_set: bool, expand_get: bool) {
        for r in &self.preset {
            out.add_preset_right(r.as_str());
        }

        if self.set_all {
            out.set_can_set_all_attrs();
            if expand_set {
                for a in &self.all_attrs {
                    out.add_settable_attr(EffectiveAttr::new(a.as_str()));
                }
            }
        }
        for a in &self.set_attrs {
            out.add_settable_attr(a.clone());
        }

        if self.get_all {
            out.set_can_get_all_attrs();
            if expand_get {
                for a in &self.all_attrs {
                    out.add_gettable_attr(EffectiveAttr::new(a.as_str()));
                }
            }
        }
        for a in &self.get_attrs {
            out.add_gettable_attr(a.clone());
        }
    }

    /// A snapshot with these rights for the given identities.
    pub fn build(&self, target_type: TargetType, target_name: &str, grantee_id: &str) -> EffectiveRights {
        let mut b = EffectiveRights::builder(target_type, None, target_name, grantee_id, grantee_id);
        self.apply(&mut b, false, false);
        b.build()
    }
}

/// Where a scripted right shows up in an all-effective-rights answer.
#[derive(Debug, Clone)]
pub enum Placement {
    All(TargetType, RightsProfile),
    Entry(TargetType, String, RightsProfile),
    Aggregation(TargetType, BTreeSet<String>, RightsProfile),
    Domain(TargetType, String, RightsProfile),
}

#[derive(Default)]
struct Script {
    /// (actor id, right) pairs the actor holds with delegation permission.
    delegable: HashSet<(String, String)>,
    /// (actor id, right) pairs partially denied to the actor.
    partially_denied: HashSet<(String, String)>,
    /// (grantee id, target key, right) → deciding grant, if reported.
    allowed: HashMap<(String, String, String), Option<ViaGrant>>,
    /// (grantee id, target name) → rights on that target.
    effective: HashMap<(String, String), RightsProfile>,
    /// grantee id → placements reported for all effective rights.
    placements: HashMap<String, Vec<Placement>>,
}

/// A [`RuleEvaluator`] that answers from a script.
pub struct ScriptedEvaluator {
    delegation: bool,
    script: RwLock<Script>,
    can_perform_calls: AtomicUsize,
}

impl Default for ScriptedEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEvaluator {
    pub fn new() -> Self {
        Self {
            delegation: true,
            script: RwLock::new(Script::default()),
            can_perform_calls: AtomicUsize::new(0),
        }
    }

    /// An evaluator reporting no delegated-admin support.
    pub fn without_delegation() -> Self {
        Self {
            delegation: false,
            ..Self::new()
        }
    }

    fn script_mut(&self) -> std::sync::RwLockWriteGuard<'_, Script> {
        self.script.write().unwrap_or_else(|e| e.into_inner())
    }

    fn script(&self) -> std::sync::RwLockReadGuard<'_, Script> {
        self.script.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Let `actor_id` grant and revoke `right` on any target.
    pub fn allow_delegation(&self, actor_id: &str, right: &str) {
        self.script_mut()
            .delegable
            .insert((actor_id.into(), right.into()));
    }

    /// Report `right` as partially denied to `actor_id`.
    pub fn deny_partially(&self, actor_id: &str, right: &str) {
        self.script_mut()
            .partially_denied
            .insert((actor_id.into(), right.into()));
    }

    /// Let `grantee_id` exercise `right` on the target stored under
    /// `target_key`.
    pub fn allow(&self, grantee_id: &str, target_key: &str, right: &str) {
        self.script_mut()
            .allowed
            .insert((grantee_id.into(), target_key.into(), right.into()), None);
    }

    /// As [`allow`](Self::allow) (or deny, with a negative `via`), reporting
    /// `via` as the deciding grant.
    pub fn decide_via(&self, grantee_id: &str, target_key: &str, right: &str, via: ViaGrant) {
        self.script_mut()
            .allowed
            .insert((grantee_id.into(), target_key.into(), right.into()), Some(via));
    }

    /// Rights of `grantee_id` on the target named `target_name`.
    pub fn set_effective(&self, grantee_id: &str, target_name: &str, profile: RightsProfile) {
        self.script_mut()
            .effective
            .insert((grantee_id.into(), target_name.into()), profile);
    }

    pub fn place(&self, grantee_id: &str, placement: Placement) {
        self.script_mut()
            .placements
            .entry(grantee_id.into())
            .or_default()
            .push(placement);
    }

    /// How many times `can_perform` was called.
    pub fn can_perform_calls(&self) -> usize {
        self.can_perform_calls.load(Ordering::SeqCst)
    }
}

impl RuleEvaluator for ScriptedEvaluator {
    fn supports_delegation(&self) -> bool {
        self.delegation
    }

    fn can_perform(
        &self,
        actor: &GranteeEntry,
        target: &TargetEntry,
        right: &Right,
        for_grant: bool,
        _attrs: Option<&AttrValues>,
        via: Option<&mut ViaGrant>,
    ) -> Result<bool> {
        self.can_perform_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script();

        if for_grant {
            return Ok(script
                .delegable
                .contains(&(actor.id.clone(), right.name().to_string())));
        }

        let key = (
            actor.id.clone(),
            target.acl_key().to_string(),
            right.name().to_string(),
        );
        match script.allowed.get(&key) {
            None => Ok(false),
            Some(None) => Ok(true),
            Some(Some(decided)) => {
                if let Some(via) = via {
                    *via = decided.clone();
                }
                Ok(!decided.is_negative)
            }
        }
    }

    fn effective_rights(
        &self,
        grantee: &GranteeEntry,
        target: &TargetEntry,
        expand_set_attrs: bool,
        expand_get_attrs: bool,
        out: &mut EffectiveRightsBuilder,
    ) -> Result<()> {
        let script = self.script();
        if let Some(profile) = script
            .effective
            .get(&(grantee.id.clone(), target.name.clone()))
        {
            profile.apply(out, expand_set_attrs, expand_get_attrs);
        }
        Ok(())
    }

    fn all_effective_rights(
        &self,
        grantee: &GranteeEntry,
        expand_set_attrs: bool,
        expand_get_attrs: bool,
        out: &mut AllEffectiveRights,
    ) -> Result<()> {
        let script = self.script();
        let Some(placements) = script.placements.get(&grantee.id) else {
            return Ok(());
        };

        let snapshot = |tt: TargetType, name: &str, profile: &RightsProfile| {
            let mut b =
                EffectiveRights::builder(tt, None, name, grantee.id.as_str(), grantee.name.as_str());
            profile.apply(&mut b, expand_set_attrs, expand_get_attrs);
            b.build()
        };

        for placement in placements {
            match placement {
                Placement::All(tt, p) => out.set_all(*tt, snapshot(*tt, "", p)),
                Placement::Entry(tt, name, p) => out.add_entry(*tt, name, snapshot(*tt, name, p)),
                Placement::Aggregation(tt, names, p) => {
                    out.add_aggregation(*tt, names, snapshot(*tt, "", p))
                }
                Placement::Domain(tt, domain, p) => out
                    .add_domain_entry(*tt, domain, snapshot(*tt, domain, p))
                    .map_err(|e| StoreError::Backend(e.to_string()))?,
            }
        }
        Ok(())
    }

    fn check_partially_denied(
        &self,
        actor: &GranteeEntry,
        _target_type: TargetType,
        target: &TargetEntry,
        right: &Right,
    ) -> Result<()> {
        if self
            .script()
            .partially_denied
            .contains(&(actor.id.clone(), right.name().to_string()))
        {
            return Err(StoreError::PermissionDenied(format!(
                "right {} is partially denied to {} on {}",
                right.name(),
                actor.name,
                target.name
            )));
        }
        Ok(())
    }
}
