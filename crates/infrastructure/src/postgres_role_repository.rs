use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use learnhub_application::{
    PermissionCatalogRepository, RolePermissionRepository, RoleRepository, RoleTransactionManager,
    RoleWriteTransaction,
};
use learnhub_core::{AppError, AppResult, CompanyId};
use learnhub_domain::{
    ActorName, GrantType, PermissionDefinition, PermissionGrant, PermissionId, Role, RoleId,
    RoleName,
};

mod roles;
mod transaction;


use transaction::PostgresRoleTransaction;

/// PostgreSQL-backed repository for roles, grants and the permission catalog.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    role_id: i64,
    company_id: i64,
    role_name: String,
    reg_by: String,
    update_by: String,
    reg_date: DateTime<Utc>,
    update_date: DateTime<Utc>,
    del_date: Option<DateTime<Utc>>,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            role_id: RoleId::new(row.role_id),
            company_id: CompanyId::new(row.company_id),
            role_name: RoleName::new(row.role_name)?,
            reg_by: ActorName::new(row.reg_by)?,
            update_by: ActorName::new(row.update_by)?,
            reg_date: row.reg_date,
            update_date: row.update_date,
            del_date: row.del_date,
        })
    }
}

#[derive(Debug, FromRow)]
struct GrantRow {
    permission_id: i64,
    grant_type: String,
}

impl TryFrom<GrantRow> for PermissionGrant {
    type Error = AppError;

    fn try_from(row: GrantRow) -> Result<Self, Self::Error> {
        Ok(Self::new(
            PermissionId::new(row.permission_id),
            GrantType::new(row.grant_type)?,
        ))
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    permission_id: i64,
    menu_name: String,
    display_name: String,
}

impl From<PermissionRow> for PermissionDefinition {
    fn from(row: PermissionRow) -> Self {
        Self {
            permission_id: PermissionId::new(row.permission_id),
            menu_name: row.menu_name,
            display_name: row.display_name,
        }
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn find_active_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.find_active_role_impl(role_id).await
    }

    async fn list_active_roles(&self, company_id: CompanyId) -> AppResult<Vec<Role>> {
        self.list_active_roles_impl(company_id).await
    }
}

#[async_trait]
impl RolePermissionRepository for PostgresRoleRepository {
    async fn list_active_grants(&self, role_id: RoleId) -> AppResult<Vec<PermissionGrant>> {
        self.list_active_grants_impl(role_id).await
    }
}

#[async_trait]
impl PermissionCatalogRepository for PostgresRoleRepository {
    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        self.list_permissions_impl().await
    }
}

#[async_trait]
impl RoleTransactionManager for PostgresRoleRepository {
    async fn begin(&self) -> AppResult<Box<dyn RoleWriteTransaction>> {
        let transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        Ok(Box::new(PostgresRoleTransaction::new(transaction)))
    }
}
