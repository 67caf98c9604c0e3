//! Right aggregations for one target type.
//!
//! A [`RightAggregation`] groups target names on which a grantee holds
//! exactly the same rights (equal digests), e.g.
//!
//! ```text
//! account-1, account-2, account-3: rights A
//! account-4, account-5:            rights B
//! account-6:                       rights X, Y
//! ```
//!
//! [`RightsByTargetType`] holds those groups for one target type, plus the
//! rights shared by *every* entry of the type and, for domained types, the
//! same grouping keyed by domain name.

use std::collections::BTreeSet;

use effright_core::{EffectiveRights, TargetType};

use crate::error::{AggregateError, Result};

/// Target names sharing one right profile.
#[derive(Debug, Clone)]
pub struct RightAggregation {
    entries: BTreeSet<String>,
    rights: EffectiveRights,
}

impl RightAggregation {
    fn new<I, S>(names: I, rights: EffectiveRights) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: names.into_iter().map(Into::into).collect(),
            rights,
        }
    }

    /// Target names in this aggregation.
    pub fn entries(&self) -> &BTreeSet<String> {
        &self.entries
    }

    /// Rights representative of every entry.
    pub fn effective_rights(&self) -> &EffectiveRights {
        &self.rights
    }

    pub fn has_entry(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    /// An aggregation can be left empty after its last entry moved to a
    /// different right profile.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_same_rights(&self, er: &EffectiveRights) -> bool {
        self.rights.has_same_rights(er)
    }
}

/// Insert or move one name.
///
/// Afterwards `name` is in exactly one aggregation, whose digest equals
/// `er`'s. The aggregation it left is kept even when empty.
fn add_entry_to(aggregations: &mut Vec<RightAggregation>, name: &str, er: EffectiveRights) {
    if let Some(ra) = aggregations.iter_mut().find(|ra| ra.has_entry(name)) {
        ra.entries.remove(name);
    }

    if let Some(ra) = aggregations.iter_mut().find(|ra| ra.has_same_rights(&er)) {
        tracing::debug!(entry = name, digest = %er.digest(), "joined aggregation");
        ra.entries.insert(name.to_string());
        return;
    }

    tracing::debug!(entry = name, digest = %er.digest(), "new aggregation");
    aggregations.push(RightAggregation::new([name], er));
}

fn add_aggregation_to(
    aggregations: &mut Vec<RightAggregation>,
    names: &BTreeSet<String>,
    er: EffectiveRights,
) {
    if let Some(ra) = aggregations.iter_mut().find(|ra| ra.has_same_rights(&er)) {
        ra.entries.extend(names.iter().cloned());
        return;
    }
    aggregations.push(RightAggregation::new(names.iter().cloned(), er));
}

/// All effective rights a grantee holds on one target type.
#[derive(Debug, Clone)]
pub struct RightsByTargetType {
    target_type: TargetType,

    /// Rights on every entry of the type.
    all: Option<EffectiveRights>,

    /// Rights on named entries.
    entries: Vec<RightAggregation>,

    /// Rights on every entry within named domains; `Some` exactly for
    /// domained target types.
    domains: Option<Vec<RightAggregation>>,
}

impl RightsByTargetType {
    pub fn new(target_type: TargetType) -> Self {
        Self {
            target_type,
            all: None,
            entries: Vec::new(),
            domains: target_type.is_domained().then(Vec::new),
        }
    }

    pub fn target_type(&self) -> TargetType {
        self.target_type
    }

    pub fn is_domained(&self) -> bool {
        self.domains.is_some()
    }

    /// Rights shared by every entry of this type.
    pub fn all(&self) -> Option<&EffectiveRights> {
        self.all.as_ref()
    }

    /// Aggregations over named entries.
    pub fn entries(&self) -> &[RightAggregation] {
        &self.entries
    }

    /// Aggregations over domain names, for domained target types.
    pub fn domains(&self) -> Option<&[RightAggregation]> {
        self.domains.as_deref()
    }

    /// Aggregations (entries or domains) listing `name`.
    pub fn aggregations_with<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a RightAggregation> + 'a {
        self.entries
            .iter()
            .chain(self.domains.iter().flatten())
            .filter(move |ra| ra.has_entry(name))
    }

    /// True when nothing has been recorded for this type.
    pub fn is_empty(&self) -> bool {
        self.all.is_none()
            && self.entries.iter().all(RightAggregation::is_empty)
            && self
                .domains
                .iter()
                .flatten()
                .all(RightAggregation::is_empty)
    }

    /// Record the rights shared by every entry of the type.
    ///
    /// Ignored when `er` carries no right. Expected at most once per type;
    /// a second call replaces the first.
    pub fn set_all(&mut self, er: EffectiveRights) {
        if er.has_no_right() {
            return;
        }
        if self.all.is_some() {
            tracing::warn!(target_type = %self.target_type, "replacing rights on all entries");
        }
        self.all = Some(er);
    }

    /// Insert or move one named entry. Ignored when `er` carries no right.
    pub fn add_entry(&mut self, name: &str, er: EffectiveRights) {
        if er.has_no_right() {
            return;
        }
        add_entry_to(&mut self.entries, name, er);
    }

    /// Bulk insert: merge `names` into the aggregation with `er`'s digest,
    /// or create one.
    ///
    /// # Precondition
    ///
    /// None of `names` may have been inserted before. Unlike
    /// [`add_entry`](Self::add_entry) there is no removal pass, so a name
    /// already placed in an aggregation with a different digest ends up
    /// listed in two aggregations.
    pub fn add_aggregation(&mut self, names: &BTreeSet<String>, er: EffectiveRights) {
        if er.has_no_right() {
            return;
        }
        add_aggregation_to(&mut self.entries, names, er);
    }

    /// Insert or move one domain, with the same semantics as
    /// [`add_entry`](Self::add_entry).
    pub fn add_domain_entry(&mut self, domain_name: &str, er: EffectiveRights) -> Result<()> {
        if er.has_no_right() {
            return Ok(());
        }
        let domains = self
            .domains
            .as_mut()
            .ok_or(AggregateError::NotDomained(self.target_type))?;
        add_entry_to(domains, domain_name, er);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rights(preset: &[&str]) -> EffectiveRights {
        EffectiveRights::builder(TargetType::Account, None, "", "g", "g")
            .preset_rights(preset.iter().copied())
            .build()
    }

    fn names(ns: &[&str]) -> BTreeSet<String> {
        ns.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_add_entry_places_name_once() {
        let mut rbtt = RightsByTargetType::new(TargetType::Account);
        let er = rights(&["a"]);

        rbtt.add_entry("acct-1", er.clone());
        rbtt.add_entry("acct-2", er.clone());

        let holding: Vec<_> = rbtt.aggregations_with("acct-1").collect();
        assert_eq!(holding.len(), 1);
        assert!(holding[0].has_same_rights(&er));
        assert_eq!(rbtt.entries().len(), 1);
        assert_eq!(rbtt.entries()[0].entries(), &names(&["acct-1", "acct-2"]));
    }

    #[test]
    fn test_add_entry_moves_on_reassignment() {
        let mut rbtt = RightsByTargetType::new(TargetType::Account);
        let a = rights(&["a"]);
        let b = rights(&["b"]);

        rbtt.add_entry("X", a.clone());
        rbtt.add_entry("X", b.clone());

        let holding: Vec<_> = rbtt.aggregations_with("X").collect();
        assert_eq!(holding.len(), 1);
        assert!(holding[0].has_same_rights(&b));

        // The abandoned aggregation is kept, empty.
        assert_eq!(rbtt.entries().len(), 2);
        let old = rbtt
            .entries()
            .iter()
            .find(|ra| ra.has_same_rights(&a))
            .unwrap();
        assert!(old.is_empty());
    }

    #[test]
    fn test_reassignment_can_revive_empty_aggregation() {
        let mut rbtt = RightsByTargetType::new(TargetType::Account);
        let a = rights(&["a"]);
        let b = rights(&["b"]);

        rbtt.add_entry("X", a.clone());
        rbtt.add_entry("X", b);
        rbtt.add_entry("X", a.clone());

        assert_eq!(rbtt.entries().len(), 2);
        let holding: Vec<_> = rbtt.aggregations_with("X").collect();
        assert_eq!(holding.len(), 1);
        assert!(holding[0].has_same_rights(&a));
    }

    #[test]
    fn test_no_right_is_ignored() {
        let mut rbtt = RightsByTargetType::new(TargetType::Account);
        rbtt.set_all(rights(&[]));
        rbtt.add_entry("X", rights(&[]));
        rbtt.add_aggregation(&names(&["Y"]), rights(&[]));
        rbtt.add_domain_entry("example.com", rights(&[])).unwrap();

        assert!(rbtt.all().is_none());
        assert!(rbtt.entries().is_empty());
        assert!(rbtt.domains().unwrap().is_empty());
        assert!(rbtt.is_empty());
    }

    #[test]
    fn test_add_aggregation_merges_same_digest() {
        let mut rbtt = RightsByTargetType::new(TargetType::Server);
        let er = rights(&["r1"]);

        rbtt.add_aggregation(&names(&["A", "B"]), er.clone());
        rbtt.add_aggregation(&names(&["B", "C"]), er);

        assert_eq!(rbtt.entries().len(), 1);
        assert_eq!(rbtt.entries()[0].entries(), &names(&["A", "B", "C"]));
    }

    #[test]
    fn test_add_aggregation_does_not_remove_prior_placement() {
        let mut rbtt = RightsByTargetType::new(TargetType::Server);
        let other = rights(&["other"]);
        let er1 = rights(&["r1"]);

        rbtt.add_entry("B", other);
        rbtt.add_aggregation(&names(&["A", "B"]), er1);

        // Known asymmetry: bulk insertion skips the removal pass.
        assert_eq!(rbtt.aggregations_with("B").count(), 2);
    }

    #[test]
    fn test_domain_entries_only_for_domained_types() {
        let mut accounts = RightsByTargetType::new(TargetType::Account);
        accounts
            .add_domain_entry("example.com", rights(&["a"]))
            .unwrap();
        assert_eq!(accounts.domains().unwrap().len(), 1);
        // Domain aggregations are separate from entry aggregations.
        assert!(accounts.entries().is_empty());

        let mut servers = RightsByTargetType::new(TargetType::Server);
        assert!(servers.domains().is_none());
        let err = servers
            .add_domain_entry("example.com", rights(&["a"]))
            .unwrap_err();
        assert!(matches!(err, AggregateError::NotDomained(TargetType::Server)));
    }

    #[test]
    fn test_empty_domain_entry_is_ignored_for_any_type() {
        let mut servers = RightsByTargetType::new(TargetType::Server);
        servers.add_domain_entry("example.com", rights(&[])).unwrap();
        assert!(servers.is_empty());
    }

    #[test]
    fn test_set_all_replaces() {
        let mut rbtt = RightsByTargetType::new(TargetType::Cos);
        rbtt.set_all(rights(&["a"]));
        rbtt.set_all(rights(&["b"]));
        assert_eq!(rbtt.all().unwrap().preset_rights(), ["b"]);
    }
}
