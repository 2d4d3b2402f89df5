use std::collections::BTreeMap;

use chrono::Utc;
use tracing::info;

use learnhub_core::{AppError, AppResult, CompanyId};
use learnhub_domain::{ActorName, PermissionDefinition, PermissionGrant, Role, RoleId, RoleName};

use crate::role_admin_ports::{
    CreateRoleInput, NewRole, ReconcileRoleInput, RoleDetail, RolePermissionGroup,
    UpdateComplete, desired_grants,
};

use super::{RoleAdminService, finish_transaction};

impl RoleAdminService {
    /// Creates a role together with its initial grants.
    pub async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        let new_role = NewRole {
            company_id: input.company_id,
            role_name: RoleName::new(input.role_name)?,
            reg_by: ActorName::new(input.reg_by)?,
        };
        let grants = desired_grants(input.grants)?;
        let now = Utc::now();

        let mut transaction = self.transaction_manager.begin().await?;
        let outcome = async {
            let role = transaction.insert_role(&new_role, now).await?;
            for grant in grants.as_slice() {
                transaction.insert_grant(role.role_id, grant, now).await?;
            }
            Ok::<_, AppError>(role)
        }
        .await;
        let role = finish_transaction(transaction, outcome).await?;

        info!(
            role_id = %role.role_id,
            company_id = %role.company_id,
            grants = grants.len(),
            "role created"
        );
        Ok(role)
    }

    /// Lists active roles of a company.
    pub async fn list_roles(&self, company_id: CompanyId) -> AppResult<Vec<Role>> {
        self.role_repository.list_active_roles(company_id).await
    }

    /// Returns a role with its grants grouped by permission.
    pub async fn role_detail(&self, role_id: RoleId) -> AppResult<RoleDetail> {
        let role = self.require_active_role(role_id).await?;
        let grants = self
            .role_permission_repository
            .list_active_grants(role_id)
            .await?;
        let catalog = self.permission_catalog.list_permissions().await?;

        Ok(RoleDetail {
            role,
            permissions: group_grants(grants, &catalog),
        })
    }

    /// Renames a role and replaces its grant set.
    pub async fn reconcile_role(
        &self,
        role_id: RoleId,
        input: ReconcileRoleInput,
    ) -> AppResult<UpdateComplete> {
        self.reconciler.reconcile_role(role_id, input).await
    }

    /// Soft-deletes a role and all of its grants.
    pub async fn delete_role(&self, role_id: RoleId, deleted_by: &str) -> AppResult<()> {
        let deleted_by = ActorName::new(deleted_by)?;
        self.require_active_role(role_id).await?;
        let now = Utc::now();

        let mut transaction = self.transaction_manager.begin().await?;
        let outcome = match transaction.soft_delete_role(role_id, &deleted_by, now).await {
            Ok(()) => transaction.delete_all_grants(role_id, now).await,
            Err(error) => Err(error),
        };
        let removed_grants = finish_transaction(transaction, outcome).await?;

        info!(%role_id, removed_grants, "role deleted");
        Ok(())
    }

    /// Lists the permission catalog.
    pub async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        self.permission_catalog.list_permissions().await
    }
}

fn group_grants(
    grants: Vec<PermissionGrant>,
    catalog: &[PermissionDefinition],
) -> Vec<RolePermissionGroup> {
    let mut groups: BTreeMap<_, RolePermissionGroup> = BTreeMap::new();

    for grant in grants {
        let group = groups.entry(grant.permission_id).or_insert_with(|| {
            let definition = catalog
                .iter()
                .find(|definition| definition.permission_id == grant.permission_id);

            RolePermissionGroup {
                permission_id: grant.permission_id,
                menu_name: definition
                    .map(|definition| definition.menu_name.clone())
                    .unwrap_or_default(),
                display_name: definition
                    .map(|definition| definition.display_name.clone())
                    .unwrap_or_default(),
                grant_types: Vec::new(),
            }
        });
        group.grant_types.push(grant.grant_type);
    }

    groups
        .into_values()
        .map(|mut group| {
            group.grant_types.sort();
            group.grant_types.dedup();
            group
        })
        .collect()
}
