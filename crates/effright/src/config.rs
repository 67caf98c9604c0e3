//! Engine configuration.

/// Configuration for [`RightCommand`](crate::RightCommand).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Allow revoking grants whose grantee no longer exists, when the
    /// grantee is addressed by id.
    pub orphan_revoke: bool,
    /// Resolve grantee display names when listing grants. Unresolvable
    /// grantees are shown by id.
    pub resolve_grantee_names: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            orphan_revoke: true,
            resolve_grantee_names: true,
        }
    }
}
