use learnhub_application::{GrantInput, RoleDetail, RolePermissionGroup};
use learnhub_domain::{PermissionDefinition, Role};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(export_to = "health-response.ts")]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Plain message payload.
#[derive(Debug, Serialize, TS)]
#[ts(export_to = "generic-message-response.ts")]
pub struct GenericMessageResponse {
    pub message: String,
}

/// One `(permission, grant type)` pair in a request body.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export_to = "grant-request.ts")]
pub struct GrantRequest {
    pub permission_id: i64,
    pub grant_type: String,
}

impl From<GrantRequest> for GrantInput {
    fn from(value: GrantRequest) -> Self {
        Self::new(value.permission_id, value.grant_type)
    }
}

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(export_to = "create-role-request.ts")]
pub struct CreateRoleRequest {
    pub role_name: String,
    pub reg_by: String,
    #[serde(default)]
    pub grants: Vec<GrantRequest>,
}

/// Incoming payload replacing a role's name and complete grant set.
#[derive(Debug, Deserialize, TS)]
#[ts(export_to = "update-role-request.ts")]
pub struct UpdateRoleRequest {
    pub role_name: String,
    pub updater_name: String,
    pub grants: Vec<GrantRequest>,
}

/// Query parameters for role deletion.
#[derive(Debug, Deserialize)]
pub struct DeleteRoleQuery {
    pub deleted_by: String,
}

/// API representation of a role.
#[derive(Debug, Serialize, TS)]
#[ts(export_to = "role-response.ts")]
pub struct RoleResponse {
    pub role_id: i64,
    pub company_id: i64,
    pub role_name: String,
    pub reg_by: String,
    pub update_by: String,
    pub reg_date: String,
    pub update_date: String,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            role_id: value.role_id.as_i64(),
            company_id: value.company_id.as_i64(),
            role_name: value.role_name.as_str().to_owned(),
            reg_by: value.reg_by.as_str().to_owned(),
            update_by: value.update_by.as_str().to_owned(),
            reg_date: value.reg_date.to_rfc3339(),
            update_date: value.update_date.to_rfc3339(),
        }
    }
}

/// Grant types a role holds for one permission.
#[derive(Debug, Serialize, TS)]
#[ts(export_to = "role-permission-response.ts")]
pub struct RolePermissionResponse {
    pub permission_id: i64,
    pub menu_name: String,
    pub display_name: String,
    pub grant_types: Vec<String>,
}

impl From<RolePermissionGroup> for RolePermissionResponse {
    fn from(value: RolePermissionGroup) -> Self {
        Self {
            permission_id: value.permission_id.as_i64(),
            menu_name: value.menu_name,
            display_name: value.display_name,
            grant_types: value.grant_types.into_iter().map(String::from).collect(),
        }
    }
}

/// API representation of a role with its grouped grants.
#[derive(Debug, Serialize, TS)]
#[ts(export_to = "role-detail-response.ts")]
pub struct RoleDetailResponse {
    pub role: RoleResponse,
    pub permissions: Vec<RolePermissionResponse>,
}

impl From<RoleDetail> for RoleDetailResponse {
    fn from(value: RoleDetail) -> Self {
        Self {
            role: RoleResponse::from(value.role),
            permissions: value
                .permissions
                .into_iter()
                .map(RolePermissionResponse::from)
                .collect(),
        }
    }
}

/// API representation of a permission catalog entry.
#[derive(Debug, Serialize, TS)]
#[ts(export_to = "permission-response.ts")]
pub struct PermissionResponse {
    pub permission_id: i64,
    pub menu_name: String,
    pub display_name: String,
}

impl From<PermissionDefinition> for PermissionResponse {
    fn from(value: PermissionDefinition) -> Self {
        Self {
            permission_id: value.permission_id.as_i64(),
            menu_name: value.menu_name,
            display_name: value.display_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CreateRoleRequest, GenericMessageResponse, GrantRequest, HealthResponse,
        PermissionResponse, RoleDetailResponse, RolePermissionResponse, RoleResponse,
        UpdateRoleRequest,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        GrantRequest::export(&config)?;
        CreateRoleRequest::export(&config)?;
        UpdateRoleRequest::export(&config)?;
        RoleResponse::export(&config)?;
        RolePermissionResponse::export(&config)?;
        RoleDetailResponse::export(&config)?;
        PermissionResponse::export(&config)?;
        GenericMessageResponse::export(&config)?;
        ErrorResponse::export(&config)?;
        HealthResponse::export(&config)?;

        Ok(())
    }

    #[test]
    fn create_role_request_defaults_to_no_grants() {
        let payload = serde_json::from_str::<CreateRoleRequest>(
            r#"{"role_name":"tutor","reg_by":"admin"}"#,
        );

        assert!(payload.is_ok_and(|payload| payload.grants.is_empty()));
    }
}
