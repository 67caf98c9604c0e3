//! Right definitions as supplied by the right catalog.
//!
//! A right is one of three shapes: a preset right (an atomic named
//! capability), an attribute right (get or set a set of attributes, possibly
//! all of them) or a combo right (a named bundle of other rights).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{CoreError, Result};
use crate::types::TargetType;

/// Name of the right that lets a domain's admins administer another domain.
pub const CROSS_DOMAIN_ADMIN: &str = "crossDomainAdmin";

/// Which attributes an attribute right covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrScope {
    /// Every attribute on the target. `expanded` is the full attribute
    /// list, reported only when a caller asks for expansion.
    All { expanded: BTreeSet<String> },
    /// An explicit set of attributes.
    Listed(BTreeSet<String>),
}

impl AttrScope {
    pub fn is_all(&self) -> bool {
        matches!(self, AttrScope::All { .. })
    }

    /// The attribute names this scope enumerates.
    pub fn attrs(&self) -> &BTreeSet<String> {
        match self {
            AttrScope::All { expanded } => expanded,
            AttrScope::Listed(attrs) => attrs,
        }
    }
}

/// The shape of a right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RightKind {
    Preset,
    GetAttrs(AttrScope),
    SetAttrs(AttrScope),
    /// Constituent right names, in declaration order.
    Combo(Vec<String>),
}

impl RightKind {
    /// The right type code used in documents.
    pub const fn type_code(&self) -> &'static str {
        match self {
            RightKind::Preset => "preset",
            RightKind::GetAttrs(_) => "getAttrs",
            RightKind::SetAttrs(_) => "setAttrs",
            RightKind::Combo(_) => "combo",
        }
    }
}

/// An immutable right definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Right {
    name: String,
    description: String,
    kind: RightKind,
    target_types: BTreeSet<TargetType>,
    user_right: bool,
}

impl Right {
    /// Define an admin right.
    ///
    /// Every right must be grantable on at least one target type, and a
    /// combo right must name at least one constituent.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: RightKind,
        target_types: impl IntoIterator<Item = TargetType>,
    ) -> Result<Self> {
        let name = name.into();
        let target_types: BTreeSet<_> = target_types.into_iter().collect();
        if name.is_empty() {
            return Err(CoreError::MalformedRight {
                name,
                reason: "empty name".into(),
            });
        }
        if target_types.is_empty() {
            return Err(CoreError::MalformedRight {
                name,
                reason: "no grantable target type".into(),
            });
        }
        if let RightKind::Combo(rights) = &kind {
            if rights.is_empty() {
                return Err(CoreError::MalformedRight {
                    name,
                    reason: "combo right without constituents".into(),
                });
            }
        }
        Ok(Self {
            name,
            description: description.into(),
            kind,
            target_types,
            user_right: false,
        })
    }

    /// Mark this right as a self-service (user) right.
    pub fn into_user_right(mut self) -> Self {
        self.user_right = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &RightKind {
        &self.kind
    }

    pub fn is_user_right(&self) -> bool {
        self.user_right
    }

    pub fn is_preset_right(&self) -> bool {
        matches!(self.kind, RightKind::Preset)
    }

    pub fn is_attr_right(&self) -> bool {
        matches!(self.kind, RightKind::GetAttrs(_) | RightKind::SetAttrs(_))
    }

    pub fn is_set_attrs_right(&self) -> bool {
        matches!(self.kind, RightKind::SetAttrs(_))
    }

    pub fn is_combo_right(&self) -> bool {
        matches!(self.kind, RightKind::Combo(_))
    }

    pub fn is_cross_domain_admin(&self) -> bool {
        self.name == CROSS_DOMAIN_ADMIN
    }

    /// Target types this right can be granted on.
    ///
    /// This is not the set of types the right is *executable* on: a right
    /// executable on accounts is usually also grantable on the domain or
    /// distribution list that contains them.
    pub fn grantable_target_types(&self) -> &BTreeSet<TargetType> {
        &self.target_types
    }

    pub fn grantable_on_target_type(&self, target_type: TargetType) -> bool {
        self.target_types.contains(&target_type)
    }

    /// Comma-separated target type codes, for documents and error messages.
    pub fn report_grantable_target_types(&self) -> String {
        self.target_types
            .iter()
            .map(TargetType::code)
            .collect::<Vec<_>>()
            .join(",")
    }
}
