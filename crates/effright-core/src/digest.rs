//! Equivalence digests for effective-rights snapshots.
//!
//! Two snapshots are "the same rights" when their digests are equal. The
//! digest covers preset right names and the *names* of gettable/settable
//! attributes only; target, grantee, attribute defaults and constraints
//! are deliberately left out.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte Blake3 hash over an ordered list of names.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameListHash(pub [u8; 32]);

impl NameListHash {
    /// Hash a list of names in the order given.
    ///
    /// Each name is length-prefixed, so `["ab", "c"]` and `["a", "bc"]`
    /// hash differently.
    pub fn of<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut hasher = blake3::Hasher::new();
        for name in names {
            hasher.update(&(name.len() as u64).to_le_bytes());
            hasher.update(name.as_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for NameListHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NameListHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for NameListHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Digest component for one attribute direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttrsDigest {
    All,
    Listed(NameListHash),
}

impl fmt::Display for AttrsDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrsDigest::All => f.write_str("all"),
            AttrsDigest::Listed(h) => write!(f, "{}", h),
        }
    }
}

/// Equivalence digest of an effective-rights snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RightsDigest {
    pub preset: NameListHash,
    pub set_attrs: AttrsDigest,
    pub get_attrs: AttrsDigest,
}

impl RightsDigest {
    /// Compute a digest. Both name lists must already be sorted.
    pub fn compute<'a, P, S, G>(
        preset: P,
        can_set_all: bool,
        set_attrs: S,
        can_get_all: bool,
        get_attrs: G,
    ) -> Self
    where
        P: IntoIterator<Item = &'a str>,
        S: IntoIterator<Item = &'a str>,
        G: IntoIterator<Item = &'a str>,
    {
        Self {
            preset: NameListHash::of(preset),
            set_attrs: attrs_digest(can_set_all, set_attrs),
            get_attrs: attrs_digest(can_get_all, get_attrs),
        }
    }
}

fn attrs_digest<'a, I>(all: bool, names: I) -> AttrsDigest
where
    I: IntoIterator<Item = &'a str>,
{
    if all {
        AttrsDigest::All
    } else {
        AttrsDigest::Listed(NameListHash::of(names))
    }
}

impl fmt::Display for RightsDigest {
    /// `preset:<hash>;setAttrs:all|<hash>;getAttrs:all|<hash>;`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "preset:{};setAttrs:{};getAttrs:{};",
            self.preset, self.set_attrs, self.get_attrs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_list_hash_is_boundary_safe() {
        assert_ne!(NameListHash::of(["ab", "c"]), NameListHash::of(["a", "bc"]));
        assert_ne!(NameListHash::of([]), NameListHash::of([""]));
    }

    #[test]
    fn test_all_ignores_listed_names() {
        let a = RightsDigest::compute([], true, ["x"], false, []);
        let b = RightsDigest::compute([], true, ["y", "z"], false, []);
        assert_eq!(a, b);
        assert_eq!(a.set_attrs, AttrsDigest::All);
    }

    #[test]
    fn test_display_format() {
        let d = RightsDigest::compute(["a"], true, [], false, ["cn"]);
        let s = d.to_string();
        assert!(s.starts_with("preset:"));
        assert!(s.contains(";setAttrs:all;"));
        assert!(s.contains(";getAttrs:"));
        assert!(s.ends_with(';'));
    }
}
