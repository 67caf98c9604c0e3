//! Effective rights snapshots.
//!
//! An [`EffectiveRights`] summarizes everything one grantee can do on one
//! target (or pseudo-target). It is filled in through an
//! [`EffectiveRightsBuilder`] by the rule evaluator and frozen by
//! [`EffectiveRightsBuilder::build`]; after that nothing can change the
//! fields the digest is computed from, so the memoized digest never goes
//! stale.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

use crate::digest::RightsDigest;
use crate::types::TargetType;

/// Constraint on the values an admin may set for one attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeConstraint {
    pub min: Option<String>,
    pub max: Option<String>,
    /// Allowed values; empty means unrestricted.
    pub values: BTreeSet<String>,
}

impl AttributeConstraint {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.values.is_empty()
    }
}

/// What a grantee may set or see for one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveAttr {
    name: String,
    default_values: BTreeSet<String>,
    constraint: Option<AttributeConstraint>,
}

impl EffectiveAttr {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_values: BTreeSet::new(),
            constraint: None,
        }
    }

    pub fn with_defaults<I, S>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_values = defaults.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_constraint(mut self, constraint: AttributeConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_values(&self) -> &BTreeSet<String> {
        &self.default_values
    }

    pub fn constraint(&self) -> Option<&AttributeConstraint> {
        self.constraint.as_ref()
    }
}

/// Attributes keyed and sorted by name.
pub type AttrMap = BTreeMap<String, EffectiveAttr>;

/// Immutable summary of a grantee's rights on a target.
#[derive(Clone)]
pub struct EffectiveRights {
    target_type: TargetType,
    target_id: String,
    target_name: String,
    grantee_id: String,
    grantee_name: String,

    preset_rights: Vec<String>,
    can_set_all_attrs: bool,
    can_set_attrs: AttrMap,
    can_get_all_attrs: bool,
    can_get_attrs: AttrMap,

    digest: OnceLock<RightsDigest>,
}

impl EffectiveRights {
    /// Start building a snapshot for the given target and grantee.
    ///
    /// A missing target id (singleton targets, pseudo-targets) is stored as
    /// the empty string.
    pub fn builder(
        target_type: TargetType,
        target_id: Option<&str>,
        target_name: impl Into<String>,
        grantee_id: impl Into<String>,
        grantee_name: impl Into<String>,
    ) -> EffectiveRightsBuilder {
        EffectiveRightsBuilder {
            target_type,
            target_id: target_id.unwrap_or_default().to_string(),
            target_name: target_name.into(),
            grantee_id: grantee_id.into(),
            grantee_name: grantee_name.into(),
            preset_rights: BTreeSet::new(),
            can_set_all_attrs: false,
            can_set_attrs: AttrMap::new(),
            can_get_all_attrs: false,
            can_get_attrs: AttrMap::new(),
        }
    }

    pub fn target_type(&self) -> TargetType {
        self.target_type
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn grantee_id(&self) -> &str {
        &self.grantee_id
    }

    pub fn grantee_name(&self) -> &str {
        &self.grantee_name
    }

    /// Preset right names, sorted.
    pub fn preset_rights(&self) -> &[String] {
        &self.preset_rights
    }

    pub fn can_set_all_attrs(&self) -> bool {
        self.can_set_all_attrs
    }

    /// Settable attributes. Not authoritative for enumeration when
    /// [`can_set_all_attrs`](Self::can_set_all_attrs) is true.
    pub fn can_set_attrs(&self) -> &AttrMap {
        &self.can_set_attrs
    }

    pub fn can_get_all_attrs(&self) -> bool {
        self.can_get_all_attrs
    }

    /// Gettable attributes. Not authoritative for enumeration when
    /// [`can_get_all_attrs`](Self::can_get_all_attrs) is true.
    pub fn can_get_attrs(&self) -> &AttrMap {
        &self.can_get_attrs
    }

    /// True when the grantee holds nothing at all on the target.
    pub fn has_no_right(&self) -> bool {
        self.preset_rights.is_empty()
            && (!self.can_set_all_attrs && self.can_set_attrs.is_empty())
            && (!self.can_get_all_attrs && self.can_get_attrs.is_empty())
    }

    /// Equivalence digest, computed on first use.
    pub fn digest(&self) -> &RightsDigest {
        self.digest.get_or_init(|| {
            RightsDigest::compute(
                self.preset_rights.iter().map(String::as_str),
                self.can_set_all_attrs,
                self.can_set_attrs.keys().map(String::as_str),
                self.can_get_all_attrs,
                self.can_get_attrs.keys().map(String::as_str),
            )
        })
    }

    /// Whether two snapshots grant the same rights, regardless of which
    /// target or grantee they describe.
    pub fn has_same_rights(&self, other: &EffectiveRights) -> bool {
        self.digest() == other.digest()
    }
}

impl fmt::Debug for EffectiveRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectiveRights")
            .field("target_type", &self.target_type)
            .field("target_id", &self.target_id)
            .field("target_name", &self.target_name)
            .field("grantee_id", &self.grantee_id)
            .field("grantee_name", &self.grantee_name)
            .field("preset_rights", &self.preset_rights)
            .field("can_set_all_attrs", &self.can_set_all_attrs)
            .field("can_set_attrs", &self.can_set_attrs)
            .field("can_get_all_attrs", &self.can_get_all_attrs)
            .field("can_get_attrs", &self.can_get_attrs)
            .finish()
    }
}

/// Full field equality, including identities and attribute details.
///
/// Use [`EffectiveRights::has_same_rights`] for right equivalence.
impl PartialEq for EffectiveRights {
    fn eq(&self, other: &Self) -> bool {
        self.target_type == other.target_type
            && self.target_id == other.target_id
            && self.target_name == other.target_name
            && self.grantee_id == other.grantee_id
            && self.grantee_name == other.grantee_name
            && self.preset_rights == other.preset_rights
            && self.can_set_all_attrs == other.can_set_all_attrs
            && self.can_set_attrs == other.can_set_attrs
            && self.can_get_all_attrs == other.can_get_all_attrs
            && self.can_get_attrs == other.can_get_attrs
    }
}

impl Eq for EffectiveRights {}

/// Mutable phase of an [`EffectiveRights`].
#[derive(Debug, Clone)]
pub struct EffectiveRightsBuilder {
    target_type: TargetType,
    target_id: String,
    target_name: String,
    grantee_id: String,
    grantee_name: String,
    preset_rights: BTreeSet<String>,
    can_set_all_attrs: bool,
    can_set_attrs: AttrMap,
    can_get_all_attrs: bool,
    can_get_attrs: AttrMap,
}

impl EffectiveRightsBuilder {
    pub fn target_type(&self) -> TargetType {
        self.target_type
    }

    pub fn preset_right(mut self, right: impl Into<String>) -> Self {
        self.add_preset_right(right);
        self
    }

    pub fn preset_rights<I, S>(mut self, rights: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for r in rights {
            self.add_preset_right(r);
        }
        self
    }

    pub fn can_set_all_attrs(mut self) -> Self {
        self.set_can_set_all_attrs();
        self
    }

    pub fn can_set_attr(mut self, attr: EffectiveAttr) -> Self {
        self.add_settable_attr(attr);
        self
    }

    pub fn can_get_all_attrs(mut self) -> Self {
        self.set_can_get_all_attrs();
        self
    }

    pub fn can_get_attr(mut self, attr: EffectiveAttr) -> Self {
        self.add_gettable_attr(attr);
        self
    }

    // In-place variants, for collaborators that fill a builder through
    // `&mut`.

    pub fn add_preset_right(&mut self, right: impl Into<String>) {
        self.preset_rights.insert(right.into());
    }

    pub fn set_can_set_all_attrs(&mut self) {
        self.can_set_all_attrs = true;
    }

    pub fn add_settable_attr(&mut self, attr: EffectiveAttr) {
        self.can_set_attrs.insert(attr.name.clone(), attr);
    }

    pub fn set_can_get_all_attrs(&mut self) {
        self.can_get_all_attrs = true;
    }

    pub fn add_gettable_attr(&mut self, attr: EffectiveAttr) {
        self.can_get_attrs.insert(attr.name.clone(), attr);
    }

    /// Freeze the snapshot.
    pub fn build(self) -> EffectiveRights {
        EffectiveRights {
            target_type: self.target_type,
            target_id: self.target_id,
            target_name: self.target_name,
            grantee_id: self.grantee_id,
            grantee_name: self.grantee_name,
            preset_rights: self.preset_rights.into_iter().collect(),
            can_set_all_attrs: self.can_set_all_attrs,
            can_set_attrs: self.can_set_attrs,
            can_get_all_attrs: self.can_get_all_attrs,
            can_get_attrs: self.can_get_attrs,
            digest: OnceLock::new(),
        }
    }
}
