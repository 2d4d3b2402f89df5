use std::sync::Arc;

use learnhub_application::{
    PermissionCatalogRepository, RoleAdminService, RolePermissionRepository, RoleRepository,
    RoleTransactionManager,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub role_admin_service: RoleAdminService,
}

impl AppState {
    /// Wires the role administration service onto one store serving every port.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: RoleRepository
            + RolePermissionRepository
            + PermissionCatalogRepository
            + RoleTransactionManager
            + 'static,
    {
        Self {
            role_admin_service: RoleAdminService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store,
            ),
        }
    }
}
