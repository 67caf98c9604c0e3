//! Proptest generators for property-based testing.

use proptest::prelude::*;

use effright_core::{
    Ace, AttributeConstraint, EffectiveAttr, EffectiveRights, Grant, GranteeType, RightModifier,
    TargetType,
};

use crate::evaluator::RightsProfile;

/// Generate a TargetType.
pub fn target_type() -> impl Strategy<Value = TargetType> {
    prop::sample::select(TargetType::ALL.to_vec())
}

/// Generate a GranteeType.
pub fn grantee_type() -> impl Strategy<Value = GranteeType> {
    prop::sample::select(GranteeType::ALL.to_vec())
}

/// Generate an optional right modifier.
pub fn right_modifier() -> impl Strategy<Value = Option<RightModifier>> {
    prop_oneof![
        Just(None),
        Just(Some(RightModifier::Deny)),
        Just(Some(RightModifier::CanDelegate)),
    ]
}

/// Generate a right name from a small vocabulary, so collisions happen.
pub fn right_name() -> impl Strategy<Value = String> {
    "[a-e]{1,2}Right".prop_map(String::from)
}

/// Generate an attribute name.
pub fn attr_name() -> impl Strategy<Value = String> {
    "attr[a-f]{1,2}".prop_map(String::from)
}

/// Generate an entry id or name.
pub fn entry_key() -> impl Strategy<Value = String> {
    "[a-z]{1,8}".prop_map(String::from)
}

fn constraint() -> impl Strategy<Value = AttributeConstraint> {
    (
        proptest::option::of("[0-9]{1,3}"),
        proptest::option::of("[0-9]{1,3}"),
        prop::collection::btree_set("[a-z]{1,4}", 0..3),
    )
        .prop_map(|(min, max, values)| AttributeConstraint { min, max, values })
}

/// Generate an attribute with random defaults and constraint.
pub fn effective_attr() -> impl Strategy<Value = EffectiveAttr> {
    (
        attr_name(),
        prop::collection::vec("[a-z0-9]{1,4}", 0..3),
        proptest::option::of(constraint()),
    )
        .prop_map(|(name, defaults, constraint)| {
            let attr = EffectiveAttr::new(name).with_defaults(defaults);
            match constraint {
                Some(c) => attr.with_constraint(c),
                None => attr,
            }
        })
}

/// Generate a rights profile; may be empty.
pub fn rights_profile() -> impl Strategy<Value = RightsProfile> {
    (
        prop::collection::vec(right_name(), 0..4),
        any::<bool>(),
        prop::collection::vec(effective_attr(), 0..4),
        any::<bool>(),
        prop::collection::vec(effective_attr(), 0..4),
    )
        .prop_map(
            |(preset, set_all, set_attrs, get_all, get_attrs)| RightsProfile {
                preset,
                set_all,
                set_attrs,
                get_all,
                get_attrs,
                all_attrs: Vec::new(),
            },
        )
}

/// Generate an effective-rights snapshot with random identities.
pub fn effective_rights() -> impl Strategy<Value = EffectiveRights> {
    (target_type(), entry_key(), entry_key(), rights_profile())
        .prop_map(|(tt, target, grantee, profile)| profile.build(tt, &target, &grantee))
}

/// Generate a persisted grant.
pub fn grant() -> impl Strategy<Value = Grant> {
    (grantee_type(), entry_key(), right_name(), right_modifier())
        .prop_map(|(gt, id, right, modifier)| Grant::new(gt, id, right, modifier))
}

/// Generate a display-form ACE.
pub fn ace() -> impl Strategy<Value = Ace> {
    (grant(), entry_key()).prop_map(|(g, name)| g.into_ace(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn digest_ignores_identity(
            profile in rights_profile(),
            a in entry_key(),
            b in entry_key(),
        ) {
            let x = profile.build(TargetType::Account, &a, &a);
            let y = profile.build(TargetType::Domain, &b, &b);
            prop_assert!(x.has_same_rights(&y));
            prop_assert_eq!(x.digest(), y.digest());
        }

        #[test]
        fn empty_profile_has_no_right(er in effective_rights()) {
            let empty = er.preset_rights().is_empty()
                && !er.can_set_all_attrs()
                && er.can_set_attrs().is_empty()
                && !er.can_get_all_attrs()
                && er.can_get_attrs().is_empty();
            prop_assert_eq!(er.has_no_right(), empty);
        }
    }
}
