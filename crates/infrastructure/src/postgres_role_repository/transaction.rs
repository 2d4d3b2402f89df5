use learnhub_application::{NewRole, RoleAttributesUpdate};
use learnhub_domain::GrantUpdate;
use sqlx::{Postgres, Transaction};

use super::*;

/// Open PostgreSQL transaction over role tables.
///
/// Dropping the value without committing rolls the transaction back.
pub struct PostgresRoleTransaction {
    transaction: Transaction<'static, Postgres>,
}

impl PostgresRoleTransaction {
    pub(super) fn new(transaction: Transaction<'static, Postgres>) -> Self {
        Self { transaction }
    }
}

fn require_affected(rows_affected: u64, missing: impl FnOnce() -> String) -> AppResult<()> {
    if rows_affected == 0 {
        return Err(AppError::NotFound(missing()));
    }

    Ok(())
}

#[async_trait]
impl RoleWriteTransaction for PostgresRoleTransaction {
    async fn insert_role(&mut self, role: &NewRole, at: DateTime<Utc>) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO admin_role (company_id, role_name, reg_by, update_by, reg_date, update_date)
            VALUES ($1, $2, $3, $3, $4, $4)
            RETURNING role_id, company_id, role_name, reg_by, update_by, reg_date, update_date, del_date
            "#,
        )
        .bind(role.company_id.as_i64())
        .bind(role.role_name.as_str())
        .bind(role.reg_by.as_str())
        .bind(at)
        .fetch_one(&mut *self.transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert role: {error}")))?;

        Role::try_from(row)
    }

    async fn update_role(
        &mut self,
        update: &RoleAttributesUpdate,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE admin_role
            SET role_name = $2, update_by = $3, update_date = $4
            WHERE role_id = $1
                AND del_date IS NULL
            "#,
        )
        .bind(update.role_id.as_i64())
        .bind(update.role_name.as_str())
        .bind(update.update_by.as_str())
        .bind(at)
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update role: {error}")))?
        .rows_affected();

        require_affected(rows_affected, || {
            format!("role '{}' was not found", update.role_id)
        })
    }

    async fn soft_delete_role(
        &mut self,
        role_id: RoleId,
        deleted_by: &ActorName,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE admin_role
            SET del_date = $3, update_by = $2, update_date = $3
            WHERE role_id = $1
                AND del_date IS NULL
            "#,
        )
        .bind(role_id.as_i64())
        .bind(deleted_by.as_str())
        .bind(at)
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?
        .rows_affected();

        require_affected(rows_affected, || format!("role '{role_id}' was not found"))
    }

    async fn insert_grant(
        &mut self,
        role_id: RoleId,
        grant: &PermissionGrant,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO role_permission (role_id, permission_id, grant_type, reg_date, update_date)
            VALUES ($1, $2, $3, $4, $4)
            "#,
        )
        .bind(role_id.as_i64())
        .bind(grant.permission_id.as_i64())
        .bind(grant.grant_type.as_str())
        .bind(at)
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to insert role permission: {error}"))
        })?;

        Ok(())
    }

    async fn update_grant(
        &mut self,
        role_id: RoleId,
        update: &GrantUpdate,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE role_permission
            SET grant_type = $4, update_date = $5
            WHERE role_id = $1
                AND permission_id = $2
                AND grant_type = $3
                AND del_date IS NULL
            "#,
        )
        .bind(role_id.as_i64())
        .bind(update.permission_id.as_i64())
        .bind(update.from.as_str())
        .bind(update.to.as_str())
        .bind(at)
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to update role permission: {error}"))
        })?
        .rows_affected();

        require_affected(rows_affected, || {
            format!(
                "permission '{}' with grant type '{}' was not found on role '{role_id}'",
                update.permission_id, update.from
            )
        })
    }

    async fn delete_grant(
        &mut self,
        role_id: RoleId,
        grant: &PermissionGrant,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE role_permission
            SET del_date = $4, update_date = $4
            WHERE role_id = $1
                AND permission_id = $2
                AND grant_type = $3
                AND del_date IS NULL
            "#,
        )
        .bind(role_id.as_i64())
        .bind(grant.permission_id.as_i64())
        .bind(grant.grant_type.as_str())
        .bind(at)
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete role permission: {error}"))
        })?
        .rows_affected();

        require_affected(rows_affected, || {
            format!(
                "permission '{}' with grant type '{}' was not found on role '{role_id}'",
                grant.permission_id, grant.grant_type
            )
        })
    }

    async fn delete_all_grants(&mut self, role_id: RoleId, at: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE role_permission
            SET del_date = $2, update_date = $2
            WHERE role_id = $1
                AND del_date IS NULL
            "#,
        )
        .bind(role_id.as_i64())
        .bind(at)
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete role permissions: {error}"))
        })?;

        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.transaction.rollback().await.map_err(|error| {
            AppError::Internal(format!("failed to roll back transaction: {error}"))
        })
    }
}
