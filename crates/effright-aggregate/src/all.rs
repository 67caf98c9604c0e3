//! Everything one grantee can do, across all target types.

use std::collections::{BTreeMap, BTreeSet};

use effright_core::{EffectiveRights, TargetType};

use crate::aggregation::RightsByTargetType;
use crate::error::Result;

/// A grantee's effective rights on every target type.
///
/// Every [`TargetType`] has a (possibly empty) [`RightsByTargetType`] from
/// construction on, so lookups never miss. Evaluators fill this through the
/// four mutation methods; snapshots that carry no right are dropped.
#[derive(Debug, Clone)]
pub struct AllEffectiveRights {
    grantee_type: String,
    grantee_id: String,
    grantee_name: String,
    by_target_type: BTreeMap<TargetType, RightsByTargetType>,
}

impl AllEffectiveRights {
    pub fn new(
        grantee_type: impl Into<String>,
        grantee_id: impl Into<String>,
        grantee_name: impl Into<String>,
    ) -> Self {
        let by_target_type = TargetType::ALL
            .iter()
            .map(|&tt| (tt, RightsByTargetType::new(tt)))
            .collect();
        Self {
            grantee_type: grantee_type.into(),
            grantee_id: grantee_id.into(),
            grantee_name: grantee_name.into(),
            by_target_type,
        }
    }

    pub fn grantee_type(&self) -> &str {
        &self.grantee_type
    }

    pub fn grantee_id(&self) -> &str {
        &self.grantee_id
    }

    pub fn grantee_name(&self) -> &str {
        &self.grantee_name
    }

    pub fn rights_by_target_type(&self, target_type: TargetType) -> &RightsByTargetType {
        // Populated for every variant in `new`.
        &self.by_target_type[&target_type]
    }

    fn slot(&mut self, target_type: TargetType) -> &mut RightsByTargetType {
        self.by_target_type
            .entry(target_type)
            .or_insert_with(|| RightsByTargetType::new(target_type))
    }

    /// Per-type rights in target type order.
    pub fn iter(&self) -> impl Iterator<Item = (TargetType, &RightsByTargetType)> {
        self.by_target_type.iter().map(|(tt, r)| (*tt, r))
    }

    pub fn set_all(&mut self, target_type: TargetType, er: EffectiveRights) {
        self.slot(target_type).set_all(er);
    }

    pub fn add_entry(&mut self, target_type: TargetType, name: &str, er: EffectiveRights) {
        self.slot(target_type).add_entry(name, er);
    }

    /// See [`RightsByTargetType::add_aggregation`] for the precondition on
    /// `names`.
    pub fn add_aggregation(
        &mut self,
        target_type: TargetType,
        names: &BTreeSet<String>,
        er: EffectiveRights,
    ) {
        self.slot(target_type).add_aggregation(names, er);
    }

    /// Empty snapshots are ignored. Otherwise fails with
    /// [`NotDomained`](crate::AggregateError::NotDomained) for target types
    /// without domain aggregation.
    pub fn add_domain_entry(
        &mut self,
        target_type: TargetType,
        domain_name: &str,
        er: EffectiveRights,
    ) -> Result<()> {
        self.slot(target_type).add_domain_entry(domain_name, er)
    }
}

impl<'a> IntoIterator for &'a AllEffectiveRights {
    type Item = (&'a TargetType, &'a RightsByTargetType);
    type IntoIter = std::collections::btree_map::Iter<'a, TargetType, RightsByTargetType>;

    fn into_iter(self) -> Self::IntoIter {
        self.by_target_type.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rights(tt: TargetType, preset: &[&str]) -> EffectiveRights {
        EffectiveRights::builder(tt, None, "", "u-1", "admin@example.com")
            .preset_rights(preset.iter().copied())
            .build()
    }

    #[test]
    fn test_every_target_type_present() {
        let all = AllEffectiveRights::new("usr", "u-1", "admin@example.com");
        for tt in TargetType::ALL {
            let rbtt = all.rights_by_target_type(tt);
            assert_eq!(rbtt.target_type(), tt);
            assert!(rbtt.is_empty());
            assert_eq!(rbtt.domains().is_some(), tt.is_domained());
        }
        assert_eq!(all.iter().count(), TargetType::ALL.len());
    }

    #[test]
    fn test_mutations_route_to_target_type() {
        let mut all = AllEffectiveRights::new("usr", "u-1", "admin@example.com");
        all.set_all(TargetType::Cos, rights(TargetType::Cos, &["listCos"]));
        all.add_entry(
            TargetType::Account,
            "a@example.com",
            rights(TargetType::Account, &["getAccount"]),
        );
        all.add_domain_entry(
            TargetType::DistributionList,
            "example.com",
            rights(TargetType::DistributionList, &["addDistributionListMember"]),
        )
        .unwrap();

        assert!(all.rights_by_target_type(TargetType::Cos).all().is_some());
        assert_eq!(
            all.rights_by_target_type(TargetType::Account).entries().len(),
            1
        );
        assert_eq!(
            all.rights_by_target_type(TargetType::DistributionList)
                .domains()
                .unwrap()
                .len(),
            1
        );
        assert!(all.rights_by_target_type(TargetType::Server).is_empty());
    }

    #[test]
    fn test_domain_entry_rejected_for_non_domained() {
        let mut all = AllEffectiveRights::new("usr", "u-1", "admin@example.com");
        assert!(all
            .add_domain_entry(
                TargetType::Zimlet,
                "example.com",
                rights(TargetType::Zimlet, &["listZimlet"]),
            )
            .is_err());
    }
}
