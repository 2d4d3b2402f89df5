use async_trait::async_trait;
use chrono::{DateTime, Utc};

use learnhub_core::{AppResult, CompanyId};
use learnhub_domain::{ActorName, GrantUpdate, PermissionGrant, Role, RoleId, RoleName};

/// Attributes of a role about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    /// Owning company.
    pub company_id: CompanyId,
    /// Role display name.
    pub role_name: RoleName,
    /// Creator name.
    pub reg_by: ActorName,
}

/// Attribute changes applied to an existing role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAttributesUpdate {
    /// Updated role.
    pub role_id: RoleId,
    /// New display name.
    pub role_name: RoleName,
    /// Name of the updater.
    pub update_by: ActorName,
}

/// Opens write transactions over roles and their grants.
#[async_trait]
pub trait RoleTransactionManager: Send + Sync {
    /// Begins a transaction exclusively owned by the caller.
    async fn begin(&self) -> AppResult<Box<dyn RoleWriteTransaction>>;
}

/// Write operations scoped to one open transaction.
///
/// Nothing written through a transaction is visible to readers before
/// [`RoleWriteTransaction::commit`]. Dropping a transaction without committing
/// discards every write.
#[async_trait]
pub trait RoleWriteTransaction: Send {
    /// Inserts a role and returns the stored record.
    async fn insert_role(&mut self, role: &NewRole, at: DateTime<Utc>) -> AppResult<Role>;

    /// Updates name, updater and update timestamp of an active role.
    async fn update_role(
        &mut self,
        update: &RoleAttributesUpdate,
        at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Soft-deletes an active role.
    async fn soft_delete_role(
        &mut self,
        role_id: RoleId,
        deleted_by: &ActorName,
        at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Creates an active grant row.
    async fn insert_grant(
        &mut self,
        role_id: RoleId,
        grant: &PermissionGrant,
        at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Changes the grant type of the active row matching `update.existing()`.
    async fn update_grant(
        &mut self,
        role_id: RoleId,
        update: &GrantUpdate,
        at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Soft-deletes the active row matching `(role, permission, grant type)`.
    async fn delete_grant(
        &mut self,
        role_id: RoleId,
        grant: &PermissionGrant,
        at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Soft-deletes every active grant of a role and returns the number of rows.
    async fn delete_all_grants(&mut self, role_id: RoleId, at: DateTime<Utc>) -> AppResult<u64>;

    /// Makes every write of the transaction visible.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discards every write of the transaction.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}
