//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod grant_diff;
mod permission;
mod role;

pub use grant_diff::{GrantUpdate, PermissionGrantDiff, diff_permission_grants};
pub use permission::{
    DesiredGrants, GRANT_TYPE_MAX_LENGTH, GrantType, PermissionDefinition, PermissionGrant,
    PermissionId, RolePermission,
};
pub use role::{
    ACTOR_NAME_MAX_LENGTH, ActorName, ROLE_NAME_MAX_LENGTH, Role, RoleId, RoleName,
};
