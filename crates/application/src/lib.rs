//! Application services and ports.

#![forbid(unsafe_code)]

mod role_admin_ports;
mod role_admin_service;

pub use role_admin_ports::{
    CreateRoleInput, GrantInput, NewRole, PermissionCatalogRepository, ReconcileRoleInput,
    RoleAttributesUpdate, RoleDetail, RolePermissionGroup, RolePermissionRepository,
    RoleRepository, RoleTransactionManager, RoleWriteTransaction, UpdateComplete,
};
pub use role_admin_service::{RoleAdminService, RoleReconciler};
