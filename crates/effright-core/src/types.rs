//! Strong type definitions for targets, grantees and addressing modes.
//!
//! Every type here renders to and parses from the short code used in
//! transport documents and persisted grants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// The kind of directory entry a right can be granted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetType {
    #[serde(rename = "account")]
    Account,
    #[serde(rename = "calresource")]
    CalendarResource,
    #[serde(rename = "cos")]
    Cos,
    #[serde(rename = "dl")]
    DistributionList,
    #[serde(rename = "domain")]
    Domain,
    #[serde(rename = "server")]
    Server,
    #[serde(rename = "xmppcomponent")]
    XmppComponent,
    #[serde(rename = "zimlet")]
    Zimlet,
    #[serde(rename = "config")]
    Config,
    #[serde(rename = "global")]
    Global,
}

impl TargetType {
    /// Every target type, in declaration order.
    pub const ALL: [TargetType; 10] = [
        TargetType::Account,
        TargetType::CalendarResource,
        TargetType::Cos,
        TargetType::DistributionList,
        TargetType::Domain,
        TargetType::Server,
        TargetType::XmppComponent,
        TargetType::Zimlet,
        TargetType::Config,
        TargetType::Global,
    ];

    /// The code used in documents and persisted grants.
    pub const fn code(&self) -> &'static str {
        match self {
            TargetType::Account => "account",
            TargetType::CalendarResource => "calresource",
            TargetType::Cos => "cos",
            TargetType::DistributionList => "dl",
            TargetType::Domain => "domain",
            TargetType::Server => "server",
            TargetType::XmppComponent => "xmppcomponent",
            TargetType::Zimlet => "zimlet",
            TargetType::Config => "config",
            TargetType::Global => "global",
        }
    }

    /// Whether entries of this type belong to a domain and can be
    /// summarized per domain.
    pub const fn is_domained(&self) -> bool {
        matches!(
            self,
            TargetType::Account | TargetType::CalendarResource | TargetType::DistributionList
        )
    }

    /// Whether entries of this type carry a directory id.
    ///
    /// The global config and the global grant entry are singletons.
    pub const fn has_id(&self) -> bool {
        !matches!(self, TargetType::Config | TargetType::Global)
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TargetType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetType::ALL
            .into_iter()
            .find(|tt| tt.code() == s)
            .ok_or_else(|| CoreError::UnknownTargetType(s.to_string()))
    }
}

/// The kind of principal a grant is made to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GranteeType {
    /// An account.
    #[serde(rename = "usr")]
    User,
    /// A distribution list used as a group.
    #[serde(rename = "grp")]
    Group,
    /// A domain; only valid for the cross-domain-admin right.
    #[serde(rename = "dom")]
    Domain,
    /// Any authenticated user.
    #[serde(rename = "all")]
    AuthUser,
    /// Anyone, authenticated or not.
    #[serde(rename = "pub")]
    Public,
}

impl GranteeType {
    pub const ALL: [GranteeType; 5] = [
        GranteeType::User,
        GranteeType::Group,
        GranteeType::Domain,
        GranteeType::AuthUser,
        GranteeType::Public,
    ];

    pub const fn code(&self) -> &'static str {
        match self {
            GranteeType::User => "usr",
            GranteeType::Group => "grp",
            GranteeType::Domain => "dom",
            GranteeType::AuthUser => "all",
            GranteeType::Public => "pub",
        }
    }
}

impl fmt::Display for GranteeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for GranteeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GranteeType::ALL
            .into_iter()
            .find(|gt| gt.code() == s)
            .ok_or_else(|| CoreError::UnknownGranteeType(s.to_string()))
    }
}

/// How an entry is addressed in a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum By {
    /// By immutable directory id.
    Id,
    /// By (mutable) name.
    Name,
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            By::Id => f.write_str("id"),
            By::Name => f.write_str("name"),
        }
    }
}

impl FromStr for By {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(By::Id),
            "name" => Ok(By::Name),
            other => Err(CoreError::UnknownBy(other.to_string())),
        }
    }
}

/// Annotation on a grant. DENY and CAN_DELEGATE are mutually exclusive,
/// so an unannotated grant is `None` at the use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RightModifier {
    /// Negative grant.
    #[serde(rename = "-")]
    Deny,
    /// Positive grant that the grantee may further delegate.
    #[serde(rename = "+")]
    CanDelegate,
}

impl RightModifier {
    /// Single-character marker used in persisted grants.
    pub const fn marker(&self) -> char {
        match self {
            RightModifier::Deny => '-',
            RightModifier::CanDelegate => '+',
        }
    }

    /// Inverse of [`RightModifier::marker`].
    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            '-' => Some(RightModifier::Deny),
            '+' => Some(RightModifier::CanDelegate),
            _ => None,
        }
    }

    /// Build from the two boolean flags used in documents.
    ///
    /// Deny wins when both are set.
    pub fn from_flags(deny: bool, can_delegate: bool) -> Option<Self> {
        if deny {
            Some(RightModifier::Deny)
        } else if can_delegate {
            Some(RightModifier::CanDelegate)
        } else {
            None
        }
    }
}

impl fmt::Display for RightModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RightModifier::Deny => f.write_str("DENY"),
            RightModifier::CanDelegate => f.write_str("CAN_DELEGATE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_type_codes_roundtrip() {
        for tt in TargetType::ALL {
            assert_eq!(tt.code().parse::<TargetType>().unwrap(), tt);
        }
        assert!("mailbox".parse::<TargetType>().is_err());
    }

    #[test]
    fn test_domained_target_types() {
        let domained: Vec<_> = TargetType::ALL
            .into_iter()
            .filter(|tt| tt.is_domained())
            .collect();
        assert_eq!(
            domained,
            vec![
                TargetType::Account,
                TargetType::CalendarResource,
                TargetType::DistributionList
            ]
        );
    }

    #[test]
    fn test_modifier_flags() {
        assert_eq!(RightModifier::from_flags(false, false), None);
        assert_eq!(RightModifier::from_flags(true, false), Some(RightModifier::Deny));
        assert_eq!(
            RightModifier::from_flags(false, true),
            Some(RightModifier::CanDelegate)
        );
        // Only one can be set; deny takes precedence.
        assert_eq!(RightModifier::from_flags(true, true), Some(RightModifier::Deny));
    }

    #[test]
    fn test_modifier_marker() {
        for m in [RightModifier::Deny, RightModifier::CanDelegate] {
            assert_eq!(RightModifier::from_marker(m.marker()), Some(m));
        }
        assert_eq!(RightModifier::from_marker('x'), None);
    }
}
