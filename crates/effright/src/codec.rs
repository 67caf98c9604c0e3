//! Transport documents for ACLs, effective rights and right definitions.
//!
//! Each document is a plain serde struct that can be rendered as JSON or
//! CBOR through the [`Document`] trait. Documents carry values only; a
//! decoded right is always re-resolved against the catalog.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use effright_core::{
    Ace, Acl, AttrMap, AttrScope, AttributeConstraint, EffectiveAttr, EffectiveRights,
    GranteeType, Right, RightKind, RightModifier, TargetType,
};
use effright_store::RightCatalog;

use crate::error::{EngineError, Result};

/// JSON and CBOR encodings for every document type.
pub trait Document: Serialize + DeserializeOwned {
    fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| EngineError::Codec(e.to_string()))
    }

    fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::Codec(e.to_string()))
    }

    fn to_cbor(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| EngineError::Codec(e.to_string()))?;
        Ok(buf)
    }

    fn from_cbor(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| EngineError::Codec(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ACL
// ─────────────────────────────────────────────────────────────────────────────

/// One grant in an ACL document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantDocument {
    #[serde(rename = "type")]
    pub grantee_type: GranteeType,
    pub id: String,
    pub name: String,
    pub right: String,
    #[serde(default)]
    pub deny: bool,
    #[serde(default)]
    pub can_delegate: bool,
}

impl From<&Ace> for GrantDocument {
    fn from(ace: &Ace) -> Self {
        let modifier = ace.right_modifier();
        Self {
            grantee_type: ace.grantee_type(),
            id: ace.grantee_id().into(),
            name: ace.grantee_name().into(),
            right: ace.right().into(),
            deny: modifier == Some(RightModifier::Deny),
            can_delegate: modifier == Some(RightModifier::CanDelegate),
        }
    }
}

impl GrantDocument {
    /// Only one modifier can apply; `deny` wins when both flags are set.
    pub fn to_ace(&self) -> Ace {
        Ace::new(
            self.grantee_type,
            self.id.as_str(),
            self.name.as_str(),
            self.right.as_str(),
            RightModifier::from_flags(self.deny, self.can_delegate),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclDocument {
    #[serde(default)]
    pub grants: Vec<GrantDocument>,
}

impl From<&Acl> for AclDocument {
    fn from(acl: &Acl) -> Self {
        Self {
            grants: acl.aces().map(GrantDocument::from).collect(),
        }
    }
}

impl AclDocument {
    pub fn to_acl(&self) -> Acl {
        self.grants.iter().map(GrantDocument::to_ace).collect()
    }
}

impl Document for AclDocument {}

// ─────────────────────────────────────────────────────────────────────────────
// Effective rights
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// One attribute: name, optional constraint, optional defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrDocument {
    pub n: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<ConstraintDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default: Vec<String>,
}

impl AttrDocument {
    fn named(n: &str) -> Self {
        Self {
            n: n.into(),
            constraint: None,
            default: Vec::new(),
        }
    }
}

impl From<&EffectiveAttr> for AttrDocument {
    fn from(attr: &EffectiveAttr) -> Self {
        Self {
            n: attr.name().into(),
            constraint: attr.constraint().map(|c| ConstraintDocument {
                min: c.min.clone(),
                max: c.max.clone(),
                values: c.values.iter().cloned().collect(),
            }),
            default: attr.default_values().iter().cloned().collect(),
        }
    }
}

impl AttrDocument {
    fn to_effective_attr(&self) -> EffectiveAttr {
        let mut attr = EffectiveAttr::new(self.n.as_str()).with_defaults(self.default.iter());
        if let Some(c) = &self.constraint {
            attr = attr.with_constraint(AttributeConstraint {
                min: c.min.clone(),
                max: c.max.clone(),
                values: c.values.iter().cloned().collect(),
            });
        }
        attr
    }
}

/// An attribute set: everything, or the listed attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrsDocument {
    #[serde(default)]
    pub all: bool,
    #[serde(default)]
    pub a: Vec<AttrDocument>,
}

impl AttrsDocument {
    fn from_attrs(all: bool, attrs: &AttrMap) -> Self {
        Self {
            all,
            a: attrs.values().map(AttrDocument::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranteeDocument {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDocument {
    #[serde(rename = "type")]
    pub target_type: TargetType,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub right: Vec<String>,
    #[serde(default)]
    pub set_attrs: AttrsDocument,
    #[serde(default)]
    pub get_attrs: AttrsDocument,
}

/// A grantee's effective rights on one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveRightsDocument {
    pub grantee: GranteeDocument,
    pub target: TargetDocument,
}

impl From<&EffectiveRights> for EffectiveRightsDocument {
    fn from(er: &EffectiveRights) -> Self {
        Self {
            grantee: GranteeDocument {
                id: er.grantee_id().into(),
                name: er.grantee_name().into(),
            },
            target: TargetDocument {
                target_type: er.target_type(),
                id: er.target_id().into(),
                name: er.target_name().into(),
                right: er.preset_rights().to_vec(),
                set_attrs: AttrsDocument::from_attrs(er.can_set_all_attrs(), er.can_set_attrs()),
                get_attrs: AttrsDocument::from_attrs(er.can_get_all_attrs(), er.can_get_attrs()),
            },
        }
    }
}

impl EffectiveRightsDocument {
    /// Rebuild the snapshot, constraints and defaults included.
    pub fn to_effective_rights(&self) -> EffectiveRights {
        let t = &self.target;
        let id = (!t.id.is_empty()).then_some(t.id.as_str());
        let mut builder = EffectiveRights::builder(
            t.target_type,
            id,
            t.name.as_str(),
            self.grantee.id.as_str(),
            self.grantee.name.as_str(),
        )
        .preset_rights(t.right.iter());

        if t.set_attrs.all {
            builder.set_can_set_all_attrs();
        }
        for a in &t.set_attrs.a {
            builder.add_settable_attr(a.to_effective_attr());
        }
        if t.get_attrs.all {
            builder.set_can_get_all_attrs();
        }
        for a in &t.get_attrs.a {
            builder.add_gettable_attr(a.to_effective_attr());
        }
        builder.build()
    }
}

impl Document for EffectiveRightsDocument {}

/// The attributes a grantee could set when creating an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateObjectAttrsDocument {
    pub set_attrs: AttrsDocument,
}

impl From<&EffectiveRights> for CreateObjectAttrsDocument {
    fn from(er: &EffectiveRights) -> Self {
        Self {
            set_attrs: AttrsDocument::from_attrs(er.can_set_all_attrs(), er.can_set_attrs()),
        }
    }
}

impl Document for CreateObjectAttrsDocument {}

// ─────────────────────────────────────────────────────────────────────────────
// Rights
// ─────────────────────────────────────────────────────────────────────────────

/// A right definition.
///
/// At most one of `attrs` (attribute rights) and `rights` (combo rights) is
/// present; preset rights carry neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RightDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub right_type: String,
    pub target_type: String,
    pub desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<AttrsDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rights: Option<Vec<String>>,
}

impl RightDocument {
    /// Describe `right`. For rights over all attributes, the attribute list
    /// is included only with `expand_all_attrs`.
    pub fn new(right: &Right, expand_all_attrs: bool) -> Self {
        let (attrs, rights) = match right.kind() {
            RightKind::Preset => (None, None),
            RightKind::GetAttrs(scope) | RightKind::SetAttrs(scope) => {
                let listed = match scope {
                    AttrScope::All { expanded } if expand_all_attrs => Some(expanded),
                    AttrScope::All { .. } => None,
                    AttrScope::Listed(attrs) => Some(attrs),
                };
                let doc = AttrsDocument {
                    all: scope.is_all(),
                    a: listed
                        .into_iter()
                        .flatten()
                        .map(|n| AttrDocument::named(n))
                        .collect(),
                };
                (Some(doc), None)
            }
            RightKind::Combo(names) => (None, Some(names.clone())),
        };

        Self {
            name: right.name().into(),
            right_type: right.kind().type_code().into(),
            target_type: right.report_grantable_target_types(),
            desc: right.description().into(),
            attrs,
            rights,
        }
    }

    /// Decoding does not trust the document: the right is looked up by
    /// name in the catalog.
    pub fn resolve<C: RightCatalog>(&self, catalog: &C) -> Result<Right> {
        Ok(catalog.right(&self.name)?)
    }
}

impl Document for RightDocument {}
