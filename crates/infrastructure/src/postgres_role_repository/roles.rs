use super::*;

impl PostgresRoleRepository {
    pub(super) async fn find_active_role_impl(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT role_id, company_id, role_name, reg_by, update_by, reg_date, update_date, del_date
            FROM admin_role
            WHERE role_id = $1
                AND del_date IS NULL
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?
        .map(Role::try_from)
        .transpose()
    }

    pub(super) async fn list_active_roles_impl(
        &self,
        company_id: CompanyId,
    ) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT role_id, company_id, role_name, reg_by, update_by, reg_date, update_date, del_date
            FROM admin_role
            WHERE company_id = $1
                AND del_date IS NULL
            ORDER BY role_id
            "#,
        )
        .bind(company_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        rows.into_iter().map(Role::try_from).collect()
    }

    pub(super) async fn list_active_grants_impl(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<PermissionGrant>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT permission_id, grant_type
            FROM role_permission
            WHERE role_id = $1
                AND del_date IS NULL
            ORDER BY permission_id, grant_type
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role permissions: {error}")))?;

        rows.into_iter().map(PermissionGrant::try_from).collect()
    }

    pub(super) async fn list_permissions_impl(&self) -> AppResult<Vec<PermissionDefinition>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permission_id, menu_name, display_name
            FROM permission
            ORDER BY permission_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        Ok(rows.into_iter().map(PermissionDefinition::from).collect())
    }
}
