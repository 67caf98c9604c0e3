//! Grant and revoke through the engine, end to end over in-memory
//! collaborators.

mod common;

use common::{engine, engine_with, init_tracing};
use effright::core::CROSS_DOMAIN_ADMIN;
use effright::store::{AdminStatus, GranteeEntry, NotFoundKind};
use effright::{
    By, EngineConfig, EngineError, GranteeSpec, GranteeType, InvalidRequest, PermissionDenied,
    RightCommand, RightModifier, TargetSpec, TargetType,
};
use effright_testkit::fixtures::*;
use effright_testkit::{ScriptedEvaluator, TestFixture};

fn domain() -> TargetSpec {
    TargetSpec::by_name(TargetType::Domain, DOMAIN)
}

fn delegated_admin() -> GranteeSpec {
    GranteeSpec::by_name(GranteeType::User, DELEGATED_ADMIN)
}

#[test]
fn test_grant_persists_one_grant() {
    let f = TestFixture::new();
    let engine = engine(&f);

    engine
        .grant_right(None, &domain(), &delegated_admin(), "createAccount", None)
        .unwrap();

    let acl = engine.grants(&domain()).unwrap();
    assert_eq!(acl.len(), 1);
    let ace = acl.aces().next().unwrap();
    assert_eq!(ace.grantee_id(), DELEGATED_ADMIN_ID);
    assert_eq!(ace.grantee_name(), DELEGATED_ADMIN);
    assert_eq!(ace.right(), "createAccount");
    assert_eq!(ace.right_modifier(), None);
}

#[test]
fn test_revoke_can_delegate_removes_exactly_one() {
    let f = TestFixture::new();
    let engine = engine(&f);

    engine
        .grant_right(None, &domain(), &delegated_admin(), "createAccount", None)
        .unwrap();
    engine
        .grant_right(
            None,
            &domain(),
            &delegated_admin(),
            "createAccount",
            Some(RightModifier::CanDelegate),
        )
        .unwrap();
    assert_eq!(engine.grants(&domain()).unwrap().len(), 2);

    let removed = engine
        .revoke_right(
            None,
            &domain(),
            &delegated_admin(),
            "createAccount",
            Some(RightModifier::CanDelegate),
        )
        .unwrap();
    assert_eq!(removed.len(), 1);
    assert!(removed[0].can_delegate());

    let acl = engine.grants(&domain()).unwrap();
    assert_eq!(acl.len(), 1);
    assert_eq!(acl.aces().next().unwrap().right_modifier(), None);
}

#[test]
fn test_revoke_never_granted_is_no_such_grant() {
    let f = TestFixture::new();
    let engine = engine(&f);

    let err = engine
        .revoke_right(None, &domain(), &delegated_admin(), "createAccount", None)
        .unwrap_err();
    assert!(matches!(err, EngineError::NoSuchGrant(_)));

    // A grant with a different modifier does not match.
    engine
        .grant_right(
            None,
            &domain(),
            &delegated_admin(),
            "createAccount",
            Some(RightModifier::Deny),
        )
        .unwrap();
    let err = engine
        .revoke_right(None, &domain(), &delegated_admin(), "createAccount", None)
        .unwrap_err();
    assert!(matches!(err, EngineError::NoSuchGrant(_)));
}

#[test]
fn test_orphan_revoke_by_id() {
    let f = TestFixture::new();
    let engine = engine(&f);
    f.add_delegated_admin("u-gone", "gone@example.com");

    engine
        .grant_right(
            None,
            &domain(),
            &GranteeSpec::by_name(GranteeType::User, "gone@example.com"),
            "deleteAccount",
            None,
        )
        .unwrap();
    f.directory.remove_grantee(GranteeType::User, "u-gone");

    let removed = engine
        .revoke_right(
            None,
            &domain(),
            &GranteeSpec::by_id(GranteeType::User, "u-gone"),
            "deleteAccount",
            None,
        )
        .unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].grantee_id, "u-gone");
    assert!(engine.grants(&domain()).unwrap().is_empty());
}

#[test]
fn test_orphan_revoke_by_name_is_invalid() {
    let f = TestFixture::new();
    let engine = engine(&f);

    let err = engine
        .revoke_right(
            None,
            &domain(),
            &GranteeSpec::by_name(GranteeType::User, "gone@example.com"),
            "deleteAccount",
            None,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidRequest(InvalidRequest::GranteeNameUnresolvable { .. })
    ));
    assert_eq!(f.store.mutation_count(), 0);
}

#[test]
fn test_orphan_revoke_disabled_surfaces_not_found() {
    let f = TestFixture::new();
    let engine = engine_with(
        &f,
        EngineConfig {
            orphan_revoke: false,
            ..EngineConfig::default()
        },
    );

    let err = engine
        .revoke_right(
            None,
            &domain(),
            &GranteeSpec::by_id(GranteeType::User, "u-gone"),
            "deleteAccount",
            None,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::NotFound {
            kind: NotFoundKind::Account,
            ..
        }
    ));
}

#[test]
fn test_orphan_revoke_still_checks_target_type() {
    let f = TestFixture::new();
    let engine = engine(&f);

    let err = engine
        .revoke_right(
            None,
            &TargetSpec::by_name(TargetType::Server, SERVER),
            &GranteeSpec::by_id(GranteeType::User, "u-gone"),
            "createAccount",
            None,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidRequest(InvalidRequest::TargetTypeNotGrantable { .. })
    ));
    assert_eq!(f.store.call_count(), 0);
}

#[test]
fn test_non_grantable_target_type_fails_before_store() {
    let f = TestFixture::new();
    let engine = engine(&f);

    let err = engine
        .grant_right(
            None,
            &TargetSpec::by_name(TargetType::Server, SERVER),
            &delegated_admin(),
            "createAccount",
            None,
        )
        .unwrap_err();

    match err {
        EngineError::InvalidRequest(InvalidRequest::TargetTypeNotGrantable {
            right,
            target_type,
            valid,
        }) => {
            assert_eq!(right, "createAccount");
            assert_eq!(target_type, TargetType::Server);
            assert_eq!(valid, "domain");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(f.store.call_count(), 0);
}

#[test]
fn test_construction_requires_delegation_support() {
    init_tracing();
    let f = TestFixture::with_evaluator(ScriptedEvaluator::without_delegation());

    let result = RightCommand::new(
        f.directory.clone(),
        f.catalog.clone(),
        f.evaluator.clone(),
        f.store.clone(),
        EngineConfig::default(),
    );
    assert!(matches!(result, Err(EngineError::Configuration(_))));
}

#[test]
fn test_actor_without_delegation_is_denied() {
    let f = TestFixture::new();
    let engine = engine(&f);
    let actor = f.delegated_admin();
    let group = GranteeSpec::by_name(GranteeType::Group, ADMIN_GROUP);

    let err = engine
        .grant_right(Some(&actor), &domain(), &group, "createAccount", None)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::PermissionDenied(PermissionDenied::Grant { .. })
    ));
    assert_eq!(f.store.call_count(), 0);

    // Seed a grant as the system, then try to revoke it as the actor.
    engine
        .grant_right(None, &domain(), &group, "createAccount", None)
        .unwrap();
    let err = engine
        .revoke_right(Some(&actor), &domain(), &group, "createAccount", None)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::PermissionDenied(PermissionDenied::Revoke { .. })
    ));
    assert_eq!(engine.grants(&domain()).unwrap().len(), 1);
}

#[test]
fn test_actor_with_delegation_can_grant_and_revoke() {
    let f = TestFixture::new();
    let engine = engine(&f);
    let actor = f.delegated_admin();
    let group = GranteeSpec::by_name(GranteeType::Group, ADMIN_GROUP);
    f.evaluator.allow_delegation(DELEGATED_ADMIN_ID, "createAccount");

    engine
        .grant_right(Some(&actor), &domain(), &group, "createAccount", None)
        .unwrap();
    let removed = engine
        .revoke_right(Some(&actor), &domain(), &group, "createAccount", None)
        .unwrap();
    assert_eq!(removed.len(), 1);
    assert!(f.evaluator.can_perform_calls() >= 2);
}

#[test]
fn test_partial_denial_is_permission_denied() {
    let f = TestFixture::new();
    let engine = engine(&f);
    let actor = f.delegated_admin();
    f.evaluator
        .allow_delegation(DELEGATED_ADMIN_ID, "domainAdminAccountRights");
    f.evaluator
        .deny_partially(DELEGATED_ADMIN_ID, "domainAdminAccountRights");

    let err = engine
        .grant_right(
            Some(&actor),
            &domain(),
            &GranteeSpec::by_name(GranteeType::Group, ADMIN_GROUP),
            "domainAdminAccountRights",
            None,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::PermissionDenied(PermissionDenied::PartiallyDenied(_))
    ));
    assert_eq!(f.store.call_count(), 0);
}

#[test]
fn test_cross_domain_admin_grantee_rules() {
    let f = TestFixture::new();
    let engine = engine(&f);
    let other_domain = GranteeSpec::by_name(GranteeType::Domain, OTHER_DOMAIN);

    engine
        .grant_right(None, &domain(), &other_domain, CROSS_DOMAIN_ADMIN, None)
        .unwrap();

    let err = engine
        .grant_right(None, &domain(), &delegated_admin(), CROSS_DOMAIN_ADMIN, None)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidRequest(InvalidRequest::CrossDomainNeedsDomainGrantee { .. })
    ));

    let err = engine
        .grant_right(None, &domain(), &other_domain, "createAccount", None)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidRequest(InvalidRequest::DomainGranteeNotAllowed { .. })
    ));

    assert_eq!(f.store.mutation_count(), 1);
}

#[test]
fn test_grantee_must_be_delegated_admin_or_admin_group() {
    let f = TestFixture::new();
    let engine = engine(&f);

    for grantee in [
        GranteeSpec::by_name(GranteeType::User, GLOBAL_ADMIN),
        GranteeSpec::by_name(GranteeType::User, USER),
        GranteeSpec::by_id(GranteeType::AuthUser, ""),
    ] {
        let err = engine
            .grant_right(None, &domain(), &grantee, "createAccount", None)
            .unwrap_err();
        assert!(
            matches!(
                err,
                EngineError::InvalidRequest(InvalidRequest::GranteeNotAdmin { .. })
            ),
            "{grantee:?}: {err:?}"
        );
    }

    engine
        .grant_right(
            None,
            &domain(),
            &GranteeSpec::by_name(GranteeType::Group, ADMIN_GROUP),
            "createAccount",
            None,
        )
        .unwrap();
}

#[test]
fn test_user_right_bypasses_admin_checks() {
    let f = TestFixture::new();
    let engine = engine(&f);
    let user = GranteeSpec::by_name(GranteeType::User, USER);

    engine
        .grant_right(
            None,
            &TargetSpec::by_name(TargetType::Account, DELEGATED_ADMIN),
            &user,
            "viewFreeBusy",
            None,
        )
        .unwrap();

    // Target type eligibility is skipped as well.
    engine
        .grant_right(None, &domain(), &user, "viewFreeBusy", None)
        .unwrap();
    assert_eq!(f.store.mutation_count(), 2);
}

#[test]
fn test_revoke_skips_grantee_eligibility() {
    let f = TestFixture::new();
    let engine = engine(&f);

    engine
        .grant_right(None, &domain(), &delegated_admin(), "renameAccount", None)
        .unwrap();

    // The grantee loses delegated admin standing after the grant.
    f.directory.add_grantee(
        GranteeEntry::new(GranteeType::User, DELEGATED_ADMIN_ID, DELEGATED_ADMIN)
            .with_admin(AdminStatus::None),
    );

    let removed = engine
        .revoke_right(None, &domain(), &delegated_admin(), "renameAccount", None)
        .unwrap();
    assert_eq!(removed.len(), 1);
}

#[test]
fn test_unknown_right_and_target() {
    let f = TestFixture::new();
    let engine = engine(&f);

    let err = engine
        .grant_right(None, &domain(), &delegated_admin(), "noSuchRight", None)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::NotFound {
            kind: NotFoundKind::Right,
            ..
        }
    ));

    let err = engine
        .grant_right(
            None,
            &TargetSpec::new(TargetType::Domain, By::Name, "nowhere.com"),
            &delegated_admin(),
            "createAccount",
            None,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::NotFound {
            kind: NotFoundKind::Domain,
            ..
        }
    ));
    assert_eq!(f.store.call_count(), 0);
}

#[test]
fn test_grant_on_global_config() {
    let f = TestFixture::new();
    let engine = engine(&f);
    let global = TargetSpec::singleton(TargetType::Global);

    engine
        .grant_right(None, &global, &delegated_admin(), "listServer", None)
        .unwrap();
    assert_eq!(engine.grants(&global).unwrap().len(), 1);
}
