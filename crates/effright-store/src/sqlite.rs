//! SQLite implementation of the ACL store.
//!
//! One row per grant. The row layout is private to this store; the engine
//! only ever sees [`Grant`] values.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use effright_core::{Grant, GranteeType, RightModifier};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{AclStore, TargetEntry};

/// SQLite-backed ACL store. Thread-safe via internal Mutex.
pub struct SqliteAclStore {
    conn: Mutex<Connection>,
}

impl SqliteAclStore {
    /// Open a SQLite database at the given path, creating and migrating it
    /// if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(|e| {
            StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                Some(format!("mutex poisoned: {}", e)),
            ))
        })?;
        f(&mut conn)
    }
}

fn modifier_column(modifier: Option<RightModifier>) -> String {
    modifier.map(|m| m.marker().to_string()).unwrap_or_default()
}

fn row_to_grant(row: &rusqlite::Row<'_>) -> Result<Grant> {
    let grantee_type: String = row.get("grantee_type")?;
    let modifier: String = row.get("modifier")?;

    let grantee_type: GranteeType = grantee_type
        .parse()
        .map_err(|e: effright_core::CoreError| StoreError::InvalidData(e.to_string()))?;
    let modifier = match modifier.chars().next() {
        None => None,
        Some(c) => Some(RightModifier::from_marker(c).ok_or_else(|| {
            StoreError::InvalidData(format!("unknown right modifier: {}", modifier))
        })?),
    };

    Ok(Grant {
        grantee_type,
        grantee_id: row.get("grantee_id")?,
        right: row.get("right_name")?,
        modifier,
    })
}

impl AclStore for SqliteAclStore {
    fn grants(&self, target: &TargetEntry) -> Result<Vec<Grant>> {
        self.with_conn_mut(|conn| {
            let mut stmt = conn.prepare(
                "SELECT grantee_type, grantee_id, right_name, modifier FROM grants
                 WHERE target_type = ?1 AND target_key = ?2
                 ORDER BY grantee_type, grantee_id, right_name, modifier",
            )?;
            let mut rows = stmt.query(params![target.target_type.code(), target.acl_key()])?;

            let mut grants = Vec::new();
            while let Some(row) = rows.next()? {
                grants.push(row_to_grant(row)?);
            }
            Ok(grants)
        })
    }

    fn add_grants(&self, target: &TargetEntry, grants: &[Grant]) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for g in grants {
                tx.execute(
                    "INSERT OR IGNORE INTO grants
                     (target_type, target_key, grantee_type, grantee_id, right_name, modifier)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        target.target_type.code(),
                        target.acl_key(),
                        g.grantee_type.code(),
                        g.grantee_id,
                        g.right,
                        modifier_column(g.modifier),
                    ],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    fn remove_grants(&self, target: &TargetEntry, grants: &[Grant]) -> Result<Vec<Grant>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut removed = Vec::new();
            for g in grants {
                let n = tx.execute(
                    "DELETE FROM grants
                     WHERE target_type = ?1 AND target_key = ?2 AND grantee_type = ?3
                       AND grantee_id = ?4 AND right_name = ?5 AND modifier = ?6",
                    params![
                        target.target_type.code(),
                        target.acl_key(),
                        g.grantee_type.code(),
                        g.grantee_id,
                        g.right,
                        modifier_column(g.modifier),
                    ],
                )?;
                if n > 0 {
                    removed.push(g.clone());
                }
            }
            tx.commit()?;
            Ok(removed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use effright_core::TargetType;
    use tempfile::tempdir;

    fn target() -> TargetEntry {
        TargetEntry::new(TargetType::Domain, Some("d-1"), "example.com")
    }

    #[test]
    fn test_add_list_remove() {
        let store = SqliteAclStore::open_memory().unwrap();
        let deny = Grant::new(GranteeType::Group, "g-1", "deleteAccount", Some(RightModifier::Deny));
        let plain = Grant::new(GranteeType::User, "u-1", "createAccount", None);

        store
            .add_grants(&target(), &[deny.clone(), plain.clone(), plain.clone()])
            .unwrap();
        let grants = store.grants(&target()).unwrap();
        assert_eq!(grants.len(), 2);
        assert!(grants.contains(&deny));
        assert!(grants.contains(&plain));

        let removed = store.remove_grants(&target(), &[deny.clone()]).unwrap();
        assert_eq!(removed, vec![deny.clone()]);
        assert!(store.remove_grants(&target(), &[deny]).unwrap().is_empty());
        assert_eq!(store.grants(&target()).unwrap(), vec![plain]);
    }

    #[test]
    fn test_grants_are_scoped_to_target() {
        let store = SqliteAclStore::open_memory().unwrap();
        let g = Grant::new(GranteeType::User, "u-1", "createAccount", None);
        store.add_grants(&target(), &[g]).unwrap();

        let other = TargetEntry::new(TargetType::Domain, Some("d-2"), "other.com");
        assert!(store.grants(&other).unwrap().is_empty());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("acl.db");
        let g = Grant::new(
            GranteeType::User,
            "u-1",
            "renameAccount",
            Some(RightModifier::CanDelegate),
        );

        {
            let store = SqliteAclStore::open(&path).unwrap();
            store.add_grants(&target(), &[g.clone()]).unwrap();
        }

        let store = SqliteAclStore::open(&path).unwrap();
        assert_eq!(store.grants(&target()).unwrap(), vec![g]);
    }
}
