use async_trait::async_trait;

use learnhub_core::{AppResult, CompanyId};
use learnhub_domain::{PermissionDefinition, PermissionGrant, Role, RoleId};

/// Repository port for reading roles.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Finds a role that has not been soft-deleted.
    async fn find_active_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Lists active company roles ordered by identifier.
    async fn list_active_roles(&self, company_id: CompanyId) -> AppResult<Vec<Role>>;
}

/// Repository port for reading role grants.
#[async_trait]
pub trait RolePermissionRepository: Send + Sync {
    /// Lists active grants of a role ordered by permission then grant type.
    ///
    /// A role without grants yields an empty list.
    async fn list_active_grants(&self, role_id: RoleId) -> AppResult<Vec<PermissionGrant>>;
}

/// Repository port for the read-only permission catalog.
#[async_trait]
pub trait PermissionCatalogRepository: Send + Sync {
    /// Lists all permission definitions ordered by identifier.
    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>>;
}
