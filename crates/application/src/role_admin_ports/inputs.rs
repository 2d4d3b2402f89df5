use learnhub_core::{AppResult, CompanyId};
use learnhub_domain::{DesiredGrants, GrantType, PermissionGrant, PermissionId};

/// Raw `(permission, grant type)` pair supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantInput {
    /// Permission identifier.
    pub permission_id: i64,
    /// Grant type code.
    pub grant_type: String,
}

impl GrantInput {
    /// Creates a raw grant pair.
    #[must_use]
    pub fn new(permission_id: i64, grant_type: impl Into<String>) -> Self {
        Self {
            permission_id,
            grant_type: grant_type.into(),
        }
    }
}

/// Input payload for creating a role with its initial grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Owning company.
    pub company_id: CompanyId,
    /// Role display name.
    pub role_name: String,
    /// Creator name.
    pub reg_by: String,
    /// Initial grants.
    pub grants: Vec<GrantInput>,
}

/// Input payload replacing a role's name and complete grant set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileRoleInput {
    /// New role display name.
    pub role_name: String,
    /// Name of the updater.
    pub updater_name: String,
    /// Complete desired grant set.
    pub grants: Vec<GrantInput>,
}

pub(crate) fn desired_grants(grants: Vec<GrantInput>) -> AppResult<DesiredGrants> {
    let grants = grants
        .into_iter()
        .map(|grant| {
            Ok(PermissionGrant::new(
                PermissionId::new(grant.permission_id),
                GrantType::new(grant.grant_type)?,
            ))
        })
        .collect::<AppResult<Vec<_>>>()?;

    DesiredGrants::new(grants)
}
