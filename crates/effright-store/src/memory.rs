//! In-memory collaborators.
//!
//! A right catalog, a directory and an ACL store that keep everything in
//! memory. They are what the test kit wires the engine to, and they are
//! usable as-is by embedders that load their rights and entries at startup.
//! Thread-safe via RwLock.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use effright_core::{By, Grant, GranteeType, Right, TargetType};

use crate::error::{NotFoundKind, Result, StoreError};
use crate::traits::{AclStore, Directory, GranteeEntry, RightCatalog, TargetEntry};

/// Id of the built-in "any authenticated user" grantee.
pub const AUTH_USER_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Id of the built-in public grantee.
pub const PUBLIC_ID: &str = "99999999-9999-9999-9999-999999999999";

/// Name of the global config entry.
pub const GLOBAL_CONFIG_NAME: &str = "globalconfig";

/// Name of the global grant entry.
pub const GLOBAL_GRANT_NAME: &str = "globalacltarget";

// Poisoned locks are recovered: every mutation is a single map operation.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

/// Kind reported when a target of this type cannot be found.
pub fn target_not_found_kind(target_type: TargetType) -> NotFoundKind {
    match target_type {
        TargetType::Account | TargetType::CalendarResource => NotFoundKind::Account,
        TargetType::DistributionList => NotFoundKind::Group,
        TargetType::Domain => NotFoundKind::Domain,
        TargetType::Cos => NotFoundKind::Cos,
        _ => NotFoundKind::Target,
    }
}

/// Kind reported when a grantee of this type cannot be found.
pub fn grantee_not_found_kind(grantee_type: GranteeType) -> NotFoundKind {
    match grantee_type {
        GranteeType::User => NotFoundKind::Account,
        GranteeType::Group => NotFoundKind::Group,
        GranteeType::Domain => NotFoundKind::Domain,
        // Built-in grantees always resolve.
        GranteeType::AuthUser | GranteeType::Public => NotFoundKind::Account,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

/// Right catalog backed by a map.
#[derive(Default)]
pub struct MemoryCatalog {
    rights: RwLock<BTreeMap<String, Right>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rights(rights: impl IntoIterator<Item = Right>) -> Self {
        let catalog = Self::new();
        for right in rights {
            catalog.insert(right);
        }
        catalog
    }

    /// Add or replace a right.
    pub fn insert(&self, right: Right) {
        write(&self.rights).insert(right.name().to_string(), right);
    }
}

impl RightCatalog for MemoryCatalog {
    fn right(&self, name: &str) -> Result<Right> {
        let rights = read(&self.rights);
        rights
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::not_found(NotFoundKind::Right, name))
    }

    fn all_rights(&self) -> Result<BTreeMap<String, Right>> {
        let rights = read(&self.rights);
        Ok(rights.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Directory
// ─────────────────────────────────────────────────────────────────────────────

/// Directory backed by maps.
///
/// The global config and global grant targets always exist. The
/// authenticated-user and public grantees always resolve.
#[derive(Default)]
pub struct MemoryDirectory {
    inner: RwLock<MemoryDirectoryInner>,
}

#[derive(Default)]
struct MemoryDirectoryInner {
    /// Targets indexed by (type, id-or-name).
    targets: HashMap<(TargetType, String), TargetEntry>,

    /// Grantees indexed by (type, id).
    grantees: HashMap<(GranteeType, String), GranteeEntry>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        let dir = Self::default();
        dir.add_target(TargetEntry::new(TargetType::Config, None, GLOBAL_CONFIG_NAME));
        dir.add_target(TargetEntry::new(TargetType::Global, None, GLOBAL_GRANT_NAME));
        dir
    }

    pub fn add_target(&self, entry: TargetEntry) {
        let key = entry.acl_key().to_string();
        write(&self.inner)
            .targets
            .insert((entry.target_type, key), entry);
    }

    pub fn add_grantee(&self, entry: GranteeEntry) {
        write(&self.inner)
            .grantees
            .insert((entry.grantee_type, entry.id.clone()), entry);
    }

    /// Delete a grantee, leaving any grants that name it orphaned.
    pub fn remove_grantee(&self, grantee_type: GranteeType, id: &str) -> Option<GranteeEntry> {
        write(&self.inner)
            .grantees
            .remove(&(grantee_type, id.to_string()))
    }

    fn built_in_grantee(grantee_type: GranteeType) -> Option<GranteeEntry> {
        match grantee_type {
            GranteeType::AuthUser => Some(GranteeEntry::new(
                GranteeType::AuthUser,
                AUTH_USER_ID,
                "all authenticated users",
            )),
            GranteeType::Public => Some(GranteeEntry::new(GranteeType::Public, PUBLIC_ID, "public")),
            _ => None,
        }
    }
}

impl Directory for MemoryDirectory {
    fn lookup_target(&self, target_type: TargetType, by: By, key: &str) -> Result<TargetEntry> {
        let inner = read(&self.inner);
        if !target_type.has_id() {
            return inner
                .targets
                .values()
                .find(|t| t.target_type == target_type)
                .cloned()
                .ok_or_else(|| StoreError::not_found(NotFoundKind::Target, target_type.code()));
        }
        let found = match by {
            By::Id => inner.targets.get(&(target_type, key.to_string())).cloned(),
            By::Name => inner
                .targets
                .values()
                .find(|t| t.target_type == target_type && t.name == key)
                .cloned(),
        };
        found.ok_or_else(|| StoreError::not_found(target_not_found_kind(target_type), key))
    }

    fn lookup_grantee(
        &self,
        grantee_type: GranteeType,
        by: By,
        key: &str,
    ) -> Result<GranteeEntry> {
        if let Some(entry) = Self::built_in_grantee(grantee_type) {
            return Ok(entry);
        }
        let inner = read(&self.inner);
        let found = match by {
            By::Id => inner.grantees.get(&(grantee_type, key.to_string())).cloned(),
            By::Name => inner
                .grantees
                .values()
                .find(|g| g.grantee_type == grantee_type && g.name == key)
                .cloned(),
        };
        found.ok_or_else(|| StoreError::not_found(grantee_not_found_kind(grantee_type), key))
    }

    fn pseudo_target(
        &self,
        target_type: TargetType,
        domain: Option<(By, &str)>,
        cos: Option<(By, &str)>,
    ) -> Result<TargetEntry> {
        let domain = match domain {
            Some((by, key)) => Some(self.lookup_target(TargetType::Domain, by, key)?),
            None => None,
        };
        if let Some((by, key)) = cos {
            self.lookup_target(TargetType::Cos, by, key)?;
        }

        match target_type {
            TargetType::Account | TargetType::CalendarResource | TargetType::DistributionList => {
                let domain = domain.ok_or_else(|| {
                    StoreError::Unsupported(format!(
                        "a domain is required for a pseudo {} target",
                        target_type
                    ))
                })?;
                let name = format!("pseudo.pseudo@{}", domain.name);
                Ok(TargetEntry::new(target_type, None, name).in_domain(domain.name))
            }
            TargetType::Domain => {
                let name = match &domain {
                    Some(parent) => format!("pseudo.{}", parent.name),
                    None => "pseudo.pseudo".to_string(),
                };
                Ok(TargetEntry::new(TargetType::Domain, None, name))
            }
            TargetType::Cos | TargetType::Server | TargetType::XmppComponent | TargetType::Zimlet => {
                Ok(TargetEntry::new(target_type, None, "pseudo"))
            }
            TargetType::Config | TargetType::Global => Err(StoreError::Unsupported(format!(
                "cannot create a pseudo {} target",
                target_type
            ))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ACL store
// ─────────────────────────────────────────────────────────────────────────────

/// ACL store backed by a map of grant sets.
#[derive(Default)]
pub struct MemoryAclStore {
    acls: RwLock<HashMap<(TargetType, String), BTreeSet<Grant>>>,
}

impl MemoryAclStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AclStore for MemoryAclStore {
    fn grants(&self, target: &TargetEntry) -> Result<Vec<Grant>> {
        let acls = read(&self.acls);
        Ok(acls
            .get(&(target.target_type, target.acl_key().to_string()))
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn add_grants(&self, target: &TargetEntry, grants: &[Grant]) -> Result<()> {
        let mut acls = write(&self.acls);
        acls.entry((target.target_type, target.acl_key().to_string()))
            .or_default()
            .extend(grants.iter().cloned());
        Ok(())
    }

    fn remove_grants(&self, target: &TargetEntry, grants: &[Grant]) -> Result<Vec<Grant>> {
        let mut acls = write(&self.acls);
        let Some(set) = acls.get_mut(&(target.target_type, target.acl_key().to_string())) else {
            return Ok(Vec::new());
        };
        Ok(grants.iter().filter(|g| set.remove(*g)).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use effright_core::RightModifier;

    fn domain(dir: &MemoryDirectory) -> TargetEntry {
        let d = TargetEntry::new(TargetType::Domain, Some("d-1"), "example.com");
        dir.add_target(d.clone());
        d
    }

    #[test]
    fn test_lookup_by_id_and_name() {
        let dir = MemoryDirectory::new();
        let d = domain(&dir);

        assert_eq!(dir.lookup_target(TargetType::Domain, By::Id, "d-1").unwrap(), d);
        assert_eq!(
            dir.lookup_target(TargetType::Domain, By::Name, "example.com").unwrap(),
            d
        );
        let err = dir
            .lookup_target(TargetType::Domain, By::Name, "nope.com")
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound {
                kind: NotFoundKind::Domain,
                ..
            }
        ));
    }

    #[test]
    fn test_global_config_always_present() {
        let dir = MemoryDirectory::new();
        let config = dir
            .lookup_target(TargetType::Config, By::Name, GLOBAL_CONFIG_NAME)
            .unwrap();
        assert_eq!(config.id, None);

        // Singletons ignore the key.
        let global = dir.lookup_target(TargetType::Global, By::Id, "").unwrap();
        assert_eq!(global.name, GLOBAL_GRANT_NAME);
    }

    #[test]
    fn test_writes_survive_a_poisoned_lock() {
        let dir = MemoryDirectory::new();
        let catalog = MemoryCatalog::new();
        std::thread::scope(|s| {
            let _ = s
                .spawn(|| {
                    let _guard = dir.inner.write().unwrap();
                    let _rights = catalog.rights.write().unwrap();
                    panic!("writer died");
                })
                .join();
        });
        assert!(dir.inner.is_poisoned());
        assert!(catalog.rights.is_poisoned());

        let d = domain(&dir);
        assert_eq!(dir.lookup_target(TargetType::Domain, By::Id, "d-1").unwrap(), d);

        dir.add_grantee(GranteeEntry::new(GranteeType::Group, "g-1", "admins@example.com"));
        assert!(dir.remove_grantee(GranteeType::Group, "g-1").is_some());

        let right =
            Right::new("listServer", "", effright_core::RightKind::Preset, [TargetType::Server])
                .unwrap();
        catalog.insert(right);
        assert!(catalog.right("listServer").is_ok());
    }

    #[test]
    fn test_removed_grantee_is_classified() {
        let dir = MemoryDirectory::new();
        dir.add_grantee(GranteeEntry::new(GranteeType::Group, "g-1", "admins@example.com"));
        assert!(dir.remove_grantee(GranteeType::Group, "g-1").is_some());

        let err = dir
            .lookup_grantee(GranteeType::Group, By::Id, "g-1")
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound {
                kind: NotFoundKind::Group,
                ..
            }
        ));
    }

    #[test]
    fn test_pseudo_account_requires_domain() {
        let dir = MemoryDirectory::new();
        domain(&dir);

        let pseudo = dir
            .pseudo_target(TargetType::Account, Some((By::Name, "example.com")), None)
            .unwrap();
        assert_eq!(pseudo.id, None);
        assert_eq!(pseudo.domain.as_deref(), Some("example.com"));

        assert!(dir.pseudo_target(TargetType::Account, None, None).is_err());
        assert!(dir
            .pseudo_target(
                TargetType::Account,
                Some((By::Name, "example.com")),
                Some((By::Name, "missing-cos"))
            )
            .is_err());
    }

    #[test]
    fn test_acl_store_add_and_remove() {
        let store = MemoryAclStore::new();
        let target = TargetEntry::new(TargetType::Domain, Some("d-1"), "example.com");
        let g = Grant::new(
            GranteeType::User,
            "u-1",
            "createAccount",
            Some(RightModifier::CanDelegate),
        );

        store.add_grants(&target, &[g.clone(), g.clone()]).unwrap();
        assert_eq!(store.grants(&target).unwrap(), vec![g.clone()]);

        // Modifier is part of identity.
        let plain = Grant::new(GranteeType::User, "u-1", "createAccount", None);
        assert!(store.remove_grants(&target, &[plain]).unwrap().is_empty());

        assert_eq!(store.remove_grants(&target, &[g.clone()]).unwrap(), vec![g]);
        assert!(store.grants(&target).unwrap().is_empty());
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = MemoryCatalog::with_rights([Right::new(
            "getAccount",
            "",
            effright_core::RightKind::Preset,
            [TargetType::Account],
        )
        .unwrap()]);
        assert!(catalog.right("getAccount").is_ok());
        assert!(matches!(
            catalog.right("nope").unwrap_err(),
            StoreError::NotFound {
                kind: NotFoundKind::Right,
                ..
            }
        ));
        assert_eq!(catalog.all_rights().unwrap().len(), 1);
    }
}
