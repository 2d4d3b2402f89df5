use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use learnhub_core::{AppError, AppResult};
use learnhub_domain::{ActorName, PermissionGrantDiff, RoleId, RoleName, diff_permission_grants};

use crate::role_admin_ports::{
    ReconcileRoleInput, RoleAttributesUpdate, RolePermissionRepository, RoleRepository,
    RoleTransactionManager, RoleWriteTransaction, UpdateComplete, desired_grants,
};

use super::{find_required_role, finish_transaction};

/// Replaces a role's attributes and complete grant set as one atomic unit.
#[derive(Clone)]
pub struct RoleReconciler {
    role_repository: Arc<dyn RoleRepository>,
    role_permission_repository: Arc<dyn RolePermissionRepository>,
    transaction_manager: Arc<dyn RoleTransactionManager>,
}

impl RoleReconciler {
    /// Creates a reconciler from required dependencies.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        role_permission_repository: Arc<dyn RolePermissionRepository>,
        transaction_manager: Arc<dyn RoleTransactionManager>,
    ) -> Self {
        Self {
            role_repository,
            role_permission_repository,
            transaction_manager,
        }
    }

    /// Renames a role and makes its persisted grants equal the desired set.
    ///
    /// Lookup failures abort before a transaction is opened. Any failure after
    /// that rolls the transaction back and surfaces as a generic internal error,
    /// so callers never observe a partially applied update.
    pub async fn reconcile_role(
        &self,
        role_id: RoleId,
        input: ReconcileRoleInput,
    ) -> AppResult<UpdateComplete> {
        let update = RoleAttributesUpdate {
            role_id,
            role_name: RoleName::new(input.role_name)?,
            update_by: ActorName::new(input.updater_name)?,
        };
        let desired = desired_grants(input.grants)?;

        find_required_role(self.role_repository.as_ref(), role_id).await?;

        let existing = self
            .role_permission_repository
            .list_active_grants(role_id)
            .await
            .map_err(|error| {
                warn!(%role_id, %error, "failed to load role permissions");
                AppError::NotFound(format!("permissions of role '{role_id}' were not found"))
            })?;

        let diff = diff_permission_grants(&existing, &desired);
        debug!(
            %role_id,
            inserts = diff.inserts.len(),
            updates = diff.updates.len(),
            deletes = diff.deletes.len(),
            unchanged = diff.unchanged.len(),
            "computed role permission plan"
        );

        let mut transaction = self
            .transaction_manager
            .begin()
            .await
            .map_err(|error| write_failure(role_id, &error))?;

        let outcome = write_plan(transaction.as_mut(), &update, &diff, Utc::now()).await;
        finish_transaction(transaction, outcome)
            .await
            .map_err(|error| write_failure(role_id, &error))?;

        info!(%role_id, changes = diff.change_count(), "role permissions reconciled");
        Ok(UpdateComplete)
    }
}

async fn write_plan(
    transaction: &mut dyn RoleWriteTransaction,
    update: &RoleAttributesUpdate,
    diff: &PermissionGrantDiff,
    at: DateTime<Utc>,
) -> AppResult<()> {
    let role_id = update.role_id;
    transaction.update_role(update, at).await?;

    for grant in &diff.inserts {
        transaction.insert_grant(role_id, grant, at).await?;
    }

    for grant_update in &diff.updates {
        transaction.update_grant(role_id, grant_update, at).await?;
    }

    for grant in &diff.deletes {
        transaction.delete_grant(role_id, grant, at).await?;
    }

    Ok(())
}

fn write_failure(role_id: RoleId, cause: &AppError) -> AppError {
    error!(%role_id, error = %cause, "role update rolled back");
    AppError::Internal("failed to update role".to_owned())
}
