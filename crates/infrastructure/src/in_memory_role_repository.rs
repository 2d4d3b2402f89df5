use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use learnhub_application::{
    NewRole, PermissionCatalogRepository, RoleAttributesUpdate, RolePermissionRepository,
    RoleRepository, RoleTransactionManager, RoleWriteTransaction,
};
use learnhub_core::{AppError, AppResult, CompanyId};
use learnhub_domain::{
    ActorName, GrantUpdate, PermissionDefinition, PermissionGrant, Role, RoleId, RolePermission,
};


/// In-memory role repository implementation.
///
/// Transactions buffer their writes and replay them against the shared state
/// under one write lock on commit, so concurrent readers never observe a
/// partially applied transaction.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoleRepository {
    state: Arc<RwLock<RoleTables>>,
    role_sequence: Arc<AtomicI64>,
    permissions: Arc<Vec<PermissionDefinition>>,
}

impl InMemoryRoleRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty repository serving the given permission catalog.
    #[must_use]
    pub fn with_permissions(mut permissions: Vec<PermissionDefinition>) -> Self {
        permissions.sort_by_key(|definition| definition.permission_id);
        Self {
            permissions: Arc::new(permissions),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RoleTables {
    roles: BTreeMap<RoleId, Role>,
    grants: Vec<RolePermission>,
}

#[derive(Debug, Clone)]
enum PendingWrite {
    InsertRole(Role),
    UpdateRole(RoleAttributesUpdate, DateTime<Utc>),
    DeleteRole(RoleId, ActorName, DateTime<Utc>),
    InsertGrant(RoleId, PermissionGrant, DateTime<Utc>),
    UpdateGrant(RoleId, GrantUpdate, DateTime<Utc>),
    DeleteGrant(RoleId, PermissionGrant, DateTime<Utc>),
    DeleteAllGrants(RoleId, DateTime<Utc>),
}

impl RoleTables {
    fn active_role_mut(&mut self, role_id: RoleId) -> AppResult<&mut Role> {
        self.roles
            .get_mut(&role_id)
            .filter(|role| role.is_active())
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    fn active_grant_mut(
        &mut self,
        role_id: RoleId,
        grant: &PermissionGrant,
    ) -> AppResult<&mut RolePermission> {
        self.grants
            .iter_mut()
            .find(|row| row.role_id == role_id && &row.grant == grant && row.is_active())
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "permission '{}' with grant type '{}' was not found on role '{role_id}'",
                    grant.permission_id, grant.grant_type
                ))
            })
    }

    fn active_grants(&self, role_id: RoleId) -> impl Iterator<Item = &RolePermission> {
        self.grants
            .iter()
            .filter(move |row| row.role_id == role_id && row.is_active())
    }

    /// Applies one write and returns the number of affected rows.
    fn apply(&mut self, write: &PendingWrite) -> AppResult<u64> {
        match write {
            PendingWrite::InsertRole(role) => {
                self.roles.insert(role.role_id, role.clone());
                Ok(1)
            }
            PendingWrite::UpdateRole(update, at) => {
                let role = self.active_role_mut(update.role_id)?;
                role.role_name = update.role_name.clone();
                role.update_by = update.update_by.clone();
                role.update_date = *at;
                Ok(1)
            }
            PendingWrite::DeleteRole(role_id, deleted_by, at) => {
                let role = self.active_role_mut(*role_id)?;
                role.update_by = deleted_by.clone();
                role.update_date = *at;
                role.del_date = Some(*at);
                Ok(1)
            }
            PendingWrite::InsertGrant(role_id, grant, at) => {
                self.active_role_mut(*role_id)?;
                if self
                    .active_grants(*role_id)
                    .any(|row| row.grant.permission_id == grant.permission_id)
                {
                    return Err(AppError::Conflict(format!(
                        "role '{role_id}' already holds permission '{}'",
                        grant.permission_id
                    )));
                }

                self.grants.push(RolePermission {
                    role_id: *role_id,
                    grant: grant.clone(),
                    reg_date: *at,
                    update_date: *at,
                    del_date: None,
                });
                Ok(1)
            }
            PendingWrite::UpdateGrant(role_id, update, at) => {
                let row = self.active_grant_mut(*role_id, &update.existing())?;
                row.grant = update.desired();
                row.update_date = *at;
                Ok(1)
            }
            PendingWrite::DeleteGrant(role_id, grant, at) => {
                let row = self.active_grant_mut(*role_id, grant)?;
                row.update_date = *at;
                row.del_date = Some(*at);
                Ok(1)
            }
            PendingWrite::DeleteAllGrants(role_id, at) => {
                let mut affected = 0;
                for row in self
                    .grants
                    .iter_mut()
                    .filter(|row| row.role_id == *role_id && row.is_active())
                {
                    row.update_date = *at;
                    row.del_date = Some(*at);
                    affected += 1;
                }
                Ok(affected)
            }
        }
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn find_active_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .get(&role_id)
            .filter(|role| role.is_active())
            .cloned())
    }

    async fn list_active_roles(&self, company_id: CompanyId) -> AppResult<Vec<Role>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .values()
            .filter(|role| role.company_id == company_id && role.is_active())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RolePermissionRepository for InMemoryRoleRepository {
    async fn list_active_grants(&self, role_id: RoleId) -> AppResult<Vec<PermissionGrant>> {
        let state = self.state.read().await;
        let mut grants: Vec<PermissionGrant> = state
            .active_grants(role_id)
            .map(|row| row.grant.clone())
            .collect();
        grants.sort();

        Ok(grants)
    }
}

#[async_trait]
impl PermissionCatalogRepository for InMemoryRoleRepository {
    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        Ok(self.permissions.as_ref().clone())
    }
}

#[async_trait]
impl RoleTransactionManager for InMemoryRoleRepository {
    async fn begin(&self) -> AppResult<Box<dyn RoleWriteTransaction>> {
        let snapshot = self.state.read().await.clone();

        Ok(Box::new(InMemoryRoleTransaction {
            state: self.state.clone(),
            role_sequence: self.role_sequence.clone(),
            working: snapshot,
            pending: Vec::new(),
        }))
    }
}

/// Buffered transaction over [`InMemoryRoleRepository`].
#[derive(Debug)]
struct InMemoryRoleTransaction {
    state: Arc<RwLock<RoleTables>>,
    role_sequence: Arc<AtomicI64>,
    working: RoleTables,
    pending: Vec<PendingWrite>,
}

impl InMemoryRoleTransaction {
    fn stage(&mut self, write: PendingWrite) -> AppResult<u64> {
        let affected = self.working.apply(&write)?;
        self.pending.push(write);
        Ok(affected)
    }
}

#[async_trait]
impl RoleWriteTransaction for InMemoryRoleTransaction {
    async fn insert_role(&mut self, role: &NewRole, at: DateTime<Utc>) -> AppResult<Role> {
        let role_id = RoleId::new(self.role_sequence.fetch_add(1, Ordering::SeqCst) + 1);
        let stored = Role {
            role_id,
            company_id: role.company_id,
            role_name: role.role_name.clone(),
            reg_by: role.reg_by.clone(),
            update_by: role.reg_by.clone(),
            reg_date: at,
            update_date: at,
            del_date: None,
        };

        self.stage(PendingWrite::InsertRole(stored.clone()))?;
        Ok(stored)
    }

    async fn update_role(
        &mut self,
        update: &RoleAttributesUpdate,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.stage(PendingWrite::UpdateRole(update.clone(), at))
            .map(|_| ())
    }

    async fn soft_delete_role(
        &mut self,
        role_id: RoleId,
        deleted_by: &ActorName,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.stage(PendingWrite::DeleteRole(role_id, deleted_by.clone(), at))
            .map(|_| ())
    }

    async fn insert_grant(
        &mut self,
        role_id: RoleId,
        grant: &PermissionGrant,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.stage(PendingWrite::InsertGrant(role_id, grant.clone(), at))
            .map(|_| ())
    }

    async fn update_grant(
        &mut self,
        role_id: RoleId,
        update: &GrantUpdate,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.stage(PendingWrite::UpdateGrant(role_id, update.clone(), at))
            .map(|_| ())
    }

    async fn delete_grant(
        &mut self,
        role_id: RoleId,
        grant: &PermissionGrant,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.stage(PendingWrite::DeleteGrant(role_id, grant.clone(), at))
            .map(|_| ())
    }

    async fn delete_all_grants(&mut self, role_id: RoleId, at: DateTime<Utc>) -> AppResult<u64> {
        self.stage(PendingWrite::DeleteAllGrants(role_id, at))
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut state = self.state.write().await;
        let mut next = state.clone();

        for write in &self.pending {
            next.apply(write).map_err(|error| {
                AppError::Conflict(format!(
                    "role transaction conflicts with a concurrent commit: {error}"
                ))
            })?;
        }

        *state = next;
        debug!(writes = self.pending.len(), "in-memory role transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        debug!(
            writes = self.pending.len(),
            "in-memory role transaction rolled back"
        );
        Ok(())
    }
}
