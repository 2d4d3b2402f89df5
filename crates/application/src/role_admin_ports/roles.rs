use std::fmt::{Display, Formatter};

use learnhub_domain::{GrantType, PermissionId, Role};

/// Completion marker returned by a successful role update.
///
/// Callers only learn that the update happened, never the mutated state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateComplete;

impl UpdateComplete {
    /// Stable message reported to callers.
    pub const MESSAGE: &'static str = "update complete";

    /// Returns the completion message.
    #[must_use]
    pub fn message(&self) -> &'static str {
        Self::MESSAGE
    }
}

impl Display for UpdateComplete {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(Self::MESSAGE)
    }
}

/// Grant types held by a role for one permission, with catalog labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionGroup {
    /// Permission identifier.
    pub permission_id: PermissionId,
    /// Catalog menu name, empty when the permission is not in the catalog.
    pub menu_name: String,
    /// Catalog display name, empty when the permission is not in the catalog.
    pub display_name: String,
    /// Active grant types ordered by code.
    pub grant_types: Vec<GrantType>,
}

/// Role projection with grouped grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDetail {
    /// Role record.
    pub role: Role,
    /// Grants grouped by permission, ordered by permission identifier.
    pub permissions: Vec<RolePermissionGroup>,
}
