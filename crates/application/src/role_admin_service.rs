use std::sync::Arc;

use tracing::warn;

use learnhub_core::{AppError, AppResult};
use learnhub_domain::{Role, RoleId};

use crate::role_admin_ports::{
    PermissionCatalogRepository, RolePermissionRepository, RoleRepository,
    RoleTransactionManager, RoleWriteTransaction,
};

mod reconciler;
mod roles;

#[cfg(test)]
mod tests;

pub use reconciler::RoleReconciler;

/// Application service for role administration workflows.
#[derive(Clone)]
pub struct RoleAdminService {
    role_repository: Arc<dyn RoleRepository>,
    role_permission_repository: Arc<dyn RolePermissionRepository>,
    permission_catalog: Arc<dyn PermissionCatalogRepository>,
    transaction_manager: Arc<dyn RoleTransactionManager>,
    reconciler: RoleReconciler,
}

impl RoleAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        role_permission_repository: Arc<dyn RolePermissionRepository>,
        permission_catalog: Arc<dyn PermissionCatalogRepository>,
        transaction_manager: Arc<dyn RoleTransactionManager>,
    ) -> Self {
        let reconciler = RoleReconciler::new(
            role_repository.clone(),
            role_permission_repository.clone(),
            transaction_manager.clone(),
        );

        Self {
            role_repository,
            role_permission_repository,
            permission_catalog,
            transaction_manager,
            reconciler,
        }
    }

    async fn require_active_role(&self, role_id: RoleId) -> AppResult<Role> {
        find_required_role(self.role_repository.as_ref(), role_id).await
    }
}

async fn find_required_role(repository: &dyn RoleRepository, role_id: RoleId) -> AppResult<Role> {
    repository
        .find_active_role(role_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
}

/// Commits on success and rolls back on failure, returning the write outcome.
async fn finish_transaction<T>(
    transaction: Box<dyn RoleWriteTransaction>,
    outcome: AppResult<T>,
) -> AppResult<T> {
    match outcome {
        Ok(value) => {
            transaction.commit().await?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback_error) = transaction.rollback().await {
                warn!(error = %rollback_error, "failed to roll back role transaction");
            }
            Err(error)
        }
    }
}
