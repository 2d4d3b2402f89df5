mod inputs;
mod repositories;
mod roles;
mod transaction;

pub(crate) use inputs::desired_grants;
pub use inputs::{CreateRoleInput, GrantInput, ReconcileRoleInput};
pub use repositories::{PermissionCatalogRepository, RolePermissionRepository, RoleRepository};
pub use roles::{RoleDetail, RolePermissionGroup, UpdateComplete};
pub use transaction::{NewRole, RoleAttributesUpdate, RoleTransactionManager, RoleWriteTransaction};
