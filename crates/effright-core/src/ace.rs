//! Access control entries.
//!
//! A [`Grant`] is what the ACL store persists. An [`Ace`] is the display
//! form handed to callers: the same grant with the grantee's name burned
//! in, so it can be rendered without going back to the directory.
//!
//! Identity is the tuple (grantee type, grantee id, right, modifier). The
//! display name never takes part in equality, ordering or hashing.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::types::{GranteeType, RightModifier};

/// A persisted grant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Grant {
    pub grantee_type: GranteeType,
    pub grantee_id: String,
    pub right: String,
    pub modifier: Option<RightModifier>,
}

impl Grant {
    pub fn new(
        grantee_type: GranteeType,
        grantee_id: impl Into<String>,
        right: impl Into<String>,
        modifier: Option<RightModifier>,
    ) -> Self {
        Self {
            grantee_type,
            grantee_id: grantee_id.into(),
            right: right.into(),
            modifier,
        }
    }

    /// Whether this is a negative grant.
    pub fn is_deny(&self) -> bool {
        self.modifier == Some(RightModifier::Deny)
    }

    /// Whether the grantee may delegate this grant.
    pub fn can_delegate(&self) -> bool {
        self.modifier == Some(RightModifier::CanDelegate)
    }

    /// Attach a display name, producing an [`Ace`].
    pub fn into_ace(self, grantee_name: impl Into<String>) -> Ace {
        Ace {
            grantee_name: grantee_name.into(),
            grant: self,
        }
    }
}

impl fmt::Display for Grant {
    /// Renders as `<grantee-id> <grantee-type> [-|+]<right>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.grantee_id, self.grantee_type)?;
        if let Some(m) = self.modifier {
            write!(f, "{}", m.marker())?;
        }
        f.write_str(&self.right)
    }
}

/// An access control entry in display form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ace {
    grant: Grant,
    grantee_name: String,
}

impl Ace {
    pub fn new(
        grantee_type: GranteeType,
        grantee_id: impl Into<String>,
        grantee_name: impl Into<String>,
        right: impl Into<String>,
        modifier: Option<RightModifier>,
    ) -> Self {
        Grant::new(grantee_type, grantee_id, right, modifier).into_ace(grantee_name)
    }

    pub fn grantee_type(&self) -> GranteeType {
        self.grant.grantee_type
    }

    pub fn grantee_id(&self) -> &str {
        &self.grant.grantee_id
    }

    pub fn grantee_name(&self) -> &str {
        &self.grantee_name
    }

    pub fn right(&self) -> &str {
        &self.grant.right
    }

    pub fn right_modifier(&self) -> Option<RightModifier> {
        self.grant.modifier
    }

    /// The persisted form of this entry.
    pub fn grant(&self) -> &Grant {
        &self.grant
    }
}

impl PartialEq for Ace {
    fn eq(&self, other: &Self) -> bool {
        self.grant == other.grant
    }
}

impl Eq for Ace {}

impl PartialOrd for Ace {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ace {
    fn cmp(&self, other: &Self) -> Ordering {
        self.grant.cmp(&other.grant)
    }
}

impl Hash for Ace {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.grant.hash(state);
    }
}

/// The set of entries attached to one target.
///
/// Read-only once built; use [`Acl::from_iter`] or [`Acl::from_grants`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Acl {
    aces: BTreeSet<Ace>,
}

impl Acl {
    /// An empty ACL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted grants, naming each grantee with `name_of`.
    pub fn from_grants<F>(grants: impl IntoIterator<Item = Grant>, mut name_of: F) -> Self
    where
        F: FnMut(&Grant) -> String,
    {
        grants
            .into_iter()
            .map(|g| {
                let name = name_of(&g);
                g.into_ace(name)
            })
            .collect()
    }

    pub fn aces(&self) -> impl Iterator<Item = &Ace> {
        self.aces.iter()
    }

    pub fn contains(&self, ace: &Ace) -> bool {
        self.aces.contains(ace)
    }

    pub fn len(&self) -> usize {
        self.aces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aces.is_empty()
    }
}

impl FromIterator<Ace> for Acl {
    fn from_iter<I: IntoIterator<Item = Ace>>(iter: I) -> Self {
        Self {
            aces: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Acl {
    type Item = Ace;
    type IntoIter = std::collections::btree_set::IntoIter<Ace>;

    fn into_iter(self) -> Self::IntoIter {
        self.aces.into_iter()
    }
}

impl<'a> IntoIterator for &'a Acl {
    type Item = &'a Ace;
    type IntoIter = std::collections::btree_set::Iter<'a, Ace>;

    fn into_iter(self) -> Self::IntoIter {
        self.aces.iter()
    }
}
