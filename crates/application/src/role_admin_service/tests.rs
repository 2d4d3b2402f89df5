use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use learnhub_core::{AppError, AppResult, CompanyId};
use learnhub_domain::{
    ActorName, GrantType, GrantUpdate, PermissionDefinition, PermissionGrant, PermissionId, Role,
    RoleId, RoleName, RolePermission,
};

use crate::role_admin_ports::{
    CreateRoleInput, GrantInput, NewRole, PermissionCatalogRepository, ReconcileRoleInput,
    RoleAttributesUpdate, RolePermissionRepository, RoleRepository, RoleTransactionManager,
    RoleWriteTransaction, UpdateComplete,
};

use super::RoleAdminService;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct StoreState {
    roles: BTreeMap<RoleId, Role>,
    grants: Vec<RolePermission>,
    next_role_id: i64,
}

#[derive(Default)]
struct FakeRoleStore {
    state: Arc<Mutex<StoreState>>,
    fail_on_write: Option<usize>,
    fail_grant_lookup: bool,
    transactions_begun: Mutex<usize>,
    grant_lookups: Mutex<usize>,
    committed_writes: Arc<Mutex<usize>>,
}

impl FakeRoleStore {
    async fn seed_role(&self, role_id: i64, name: &str, grants: &[(i64, &str)]) {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let role_id = RoleId::new(role_id);
        state.roles.insert(
            role_id,
            Role {
                role_id,
                company_id: CompanyId::new(1),
                role_name: role_name(name),
                reg_by: actor("seed"),
                update_by: actor("seed"),
                reg_date: now,
                update_date: now,
                del_date: None,
            },
        );
        for (permission_id, value) in grants {
            state.grants.push(RolePermission {
                role_id,
                grant: grant(*permission_id, value),
                reg_date: now,
                update_date: now,
                del_date: None,
            });
        }
        state.next_role_id = state.next_role_id.max(role_id.as_i64());
    }

    async fn active_grants(&self, role_id: i64) -> Vec<PermissionGrant> {
        let mut grants: Vec<PermissionGrant> = self
            .state
            .lock()
            .await
            .grants
            .iter()
            .filter(|row| row.role_id == RoleId::new(role_id) && row.is_active())
            .map(|row| row.grant.clone())
            .collect();
        grants.sort();
        grants
    }
}

#[async_trait]
impl RoleRepository for FakeRoleStore {
    async fn find_active_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .get(&role_id)
            .filter(|role| role.is_active())
            .cloned())
    }

    async fn list_active_roles(&self, company_id: CompanyId) -> AppResult<Vec<Role>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .values()
            .filter(|role| role.company_id == company_id && role.is_active())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RolePermissionRepository for FakeRoleStore {
    async fn list_active_grants(&self, role_id: RoleId) -> AppResult<Vec<PermissionGrant>> {
        *self.grant_lookups.lock().await += 1;
        if self.fail_grant_lookup {
            return Err(AppError::Internal("grant table unavailable".to_owned()));
        }

        Ok(self.active_grants(role_id.as_i64()).await)
    }
}

#[async_trait]
impl PermissionCatalogRepository for FakeRoleStore {
    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        Ok(vec![
            PermissionDefinition {
                permission_id: PermissionId::new(1),
                menu_name: "board".to_owned(),
                display_name: "Notices".to_owned(),
            },
            PermissionDefinition {
                permission_id: PermissionId::new(2),
                menu_name: "academic".to_owned(),
                display_name: "Study plans".to_owned(),
            },
        ])
    }
}

#[async_trait]
impl RoleTransactionManager for FakeRoleStore {
    async fn begin(&self) -> AppResult<Box<dyn RoleWriteTransaction>> {
        *self.transactions_begun.lock().await += 1;
        let working = self.state.lock().await.clone();

        Ok(Box::new(FakeTransaction {
            shared: self.state.clone(),
            committed_writes: self.committed_writes.clone(),
            working,
            writes: 0,
            fail_on_write: self.fail_on_write,
        }))
    }
}

struct FakeTransaction {
    shared: Arc<Mutex<StoreState>>,
    committed_writes: Arc<Mutex<usize>>,
    working: StoreState,
    writes: usize,
    fail_on_write: Option<usize>,
}

impl FakeTransaction {
    fn record_write(&mut self) -> AppResult<()> {
        self.writes += 1;
        if self.fail_on_write == Some(self.writes) {
            return Err(AppError::Internal(format!(
                "injected failure on write {}",
                self.writes
            )));
        }

        Ok(())
    }

    fn active_row(
        &mut self,
        role_id: RoleId,
        grant: &PermissionGrant,
    ) -> Option<&mut RolePermission> {
        self.working
            .grants
            .iter_mut()
            .find(|row| row.role_id == role_id && &row.grant == grant && row.is_active())
    }
}

#[async_trait]
impl RoleWriteTransaction for FakeTransaction {
    async fn insert_role(&mut self, role: &NewRole, at: DateTime<Utc>) -> AppResult<Role> {
        self.record_write()?;
        self.working.next_role_id += 1;
        let stored = Role {
            role_id: RoleId::new(self.working.next_role_id),
            company_id: role.company_id,
            role_name: role.role_name.clone(),
            reg_by: role.reg_by.clone(),
            update_by: role.reg_by.clone(),
            reg_date: at,
            update_date: at,
            del_date: None,
        };
        self.working.roles.insert(stored.role_id, stored.clone());
        Ok(stored)
    }

    async fn update_role(
        &mut self,
        update: &RoleAttributesUpdate,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.record_write()?;
        let role = self
            .working
            .roles
            .get_mut(&update.role_id)
            .ok_or_else(|| AppError::NotFound("role".to_owned()))?;
        role.role_name = update.role_name.clone();
        role.update_by = update.update_by.clone();
        role.update_date = at;
        Ok(())
    }

    async fn soft_delete_role(
        &mut self,
        role_id: RoleId,
        deleted_by: &ActorName,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.record_write()?;
        let role = self
            .working
            .roles
            .get_mut(&role_id)
            .ok_or_else(|| AppError::NotFound("role".to_owned()))?;
        role.update_by = deleted_by.clone();
        role.del_date = Some(at);
        Ok(())
    }

    async fn insert_grant(
        &mut self,
        role_id: RoleId,
        grant: &PermissionGrant,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.record_write()?;
        self.working.grants.push(RolePermission {
            role_id,
            grant: grant.clone(),
            reg_date: at,
            update_date: at,
            del_date: None,
        });
        Ok(())
    }

    async fn update_grant(
        &mut self,
        role_id: RoleId,
        update: &GrantUpdate,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.record_write()?;
        let row = self
            .active_row(role_id, &update.existing())
            .ok_or_else(|| AppError::NotFound("grant".to_owned()))?;
        row.grant = update.desired();
        row.update_date = at;
        Ok(())
    }

    async fn delete_grant(
        &mut self,
        role_id: RoleId,
        grant: &PermissionGrant,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.record_write()?;
        let row = self
            .active_row(role_id, grant)
            .ok_or_else(|| AppError::NotFound("grant".to_owned()))?;
        row.del_date = Some(at);
        Ok(())
    }

    async fn delete_all_grants(&mut self, role_id: RoleId, at: DateTime<Utc>) -> AppResult<u64> {
        self.record_write()?;
        let mut removed = 0;
        for row in &mut self.working.grants {
            if row.role_id == role_id && row.is_active() {
                row.del_date = Some(at);
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        *self.shared.lock().await = self.working;
        *self.committed_writes.lock().await += self.writes;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}

fn role_name(value: &str) -> RoleName {
    RoleName::new(value).unwrap_or_else(|error| panic!("invalid role name: {error}"))
}

fn actor(value: &str) -> ActorName {
    ActorName::new(value).unwrap_or_else(|error| panic!("invalid actor: {error}"))
}

fn grant(permission_id: i64, value: &str) -> PermissionGrant {
    PermissionGrant::new(
        PermissionId::new(permission_id),
        GrantType::new(value).unwrap_or_else(|error| panic!("invalid grant type: {error}")),
    )
}

fn service(store: Arc<FakeRoleStore>) -> RoleAdminService {
    RoleAdminService::new(store.clone(), store.clone(), store.clone(), store)
}

fn reconcile_input(name: &str, grants: &[(i64, &str)]) -> ReconcileRoleInput {
    ReconcileRoleInput {
        role_name: name.to_owned(),
        updater_name: "admin".to_owned(),
        grants: grants
            .iter()
            .map(|(permission_id, value)| GrantInput::new(*permission_id, *value))
            .collect(),
    }
}

#[tokio::test]
async fn reconcile_role_applies_inserts_deletes_and_renames() {
    let store = Arc::new(FakeRoleStore::default());
    store.seed_role(7, "tutor", &[(1, "R"), (2, "R")]).await;

    let result = service(store.clone())
        .reconcile_role(
            RoleId::new(7),
            reconcile_input("senior tutor", &[(2, "R"), (3, "W")]),
        )
        .await;

    assert!(matches!(result, Ok(UpdateComplete)));
    assert_eq!(store.active_grants(7).await, vec![grant(2, "R"), grant(3, "W")]);

    let state = store.state.lock().await;
    let role = state.roles.get(&RoleId::new(7));
    assert_eq!(role.map(|role| role.role_name.as_str()), Some("senior tutor"));
    assert_eq!(role.map(|role| role.update_by.as_str()), Some("admin"));
    assert!(
        state
            .grants
            .iter()
            .any(|row| row.grant == grant(1, "R") && !row.is_active())
    );
}

#[tokio::test]
async fn reconcile_role_updates_grant_type_in_place() {
    let store = Arc::new(FakeRoleStore::default());
    store.seed_role(1, "tutor", &[(1, "R")]).await;

    let result = service(store.clone())
        .reconcile_role(RoleId::new(1), reconcile_input("tutor", &[(1, "W")]))
        .await;

    assert!(result.is_ok());
    assert_eq!(store.active_grants(1).await, vec![grant(1, "W")]);
    assert_eq!(store.state.lock().await.grants.len(), 1);
}

#[tokio::test]
async fn reconcile_role_accepts_role_without_grants() {
    let store = Arc::new(FakeRoleStore::default());
    store.seed_role(3, "new role", &[]).await;

    let result = service(store.clone())
        .reconcile_role(RoleId::new(3), reconcile_input("new role", &[(5, "R")]))
        .await;

    assert!(result.is_ok());
    assert_eq!(store.active_grants(3).await, vec![grant(5, "R")]);
}

#[tokio::test]
async fn reconcile_role_is_idempotent() {
    let store = Arc::new(FakeRoleStore::default());
    store.seed_role(4, "tutor", &[(1, "R"), (2, "W")]).await;
    let service = service(store.clone());

    let first = service
        .reconcile_role(RoleId::new(4), reconcile_input("tutor", &[(2, "R"), (9, "W")]))
        .await;
    assert!(first.is_ok());
    let after_first = store.active_grants(4).await;
    let writes_after_first = *store.committed_writes.lock().await;

    let second = service
        .reconcile_role(RoleId::new(4), reconcile_input("tutor", &[(2, "R"), (9, "W")]))
        .await;
    assert!(second.is_ok());

    assert_eq!(store.active_grants(4).await, after_first);
    assert_eq!(after_first, vec![grant(2, "R"), grant(9, "W")]);
    // Only the role row itself is touched the second time.
    assert_eq!(*store.committed_writes.lock().await, writes_after_first + 1);
}

#[tokio::test]
async fn failed_write_rolls_back_every_change() {
    let store = Arc::new(FakeRoleStore {
        fail_on_write: Some(3),
        ..FakeRoleStore::default()
    });
    store.seed_role(5, "tutor", &[(1, "R"), (2, "R")]).await;
    let before = store.state.lock().await.clone();

    let result = service(store.clone())
        .reconcile_role(
            RoleId::new(5),
            reconcile_input("renamed", &[(2, "W"), (3, "W"), (4, "W")]),
        )
        .await;

    assert!(matches!(result, Err(AppError::Internal(message)) if message == "failed to update role"));
    assert_eq!(*store.state.lock().await, before);
}

#[tokio::test]
async fn missing_role_short_circuits_without_writes() {
    let store = Arc::new(FakeRoleStore::default());

    let result = service(store.clone())
        .reconcile_role(RoleId::new(99), reconcile_input("ghost", &[(1, "R")]))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(*store.transactions_begun.lock().await, 0);
    assert_eq!(*store.grant_lookups.lock().await, 0);
}

#[tokio::test]
async fn grant_lookup_failure_is_reported_as_not_found() {
    let store = Arc::new(FakeRoleStore {
        fail_grant_lookup: true,
        ..FakeRoleStore::default()
    });
    store.seed_role(6, "tutor", &[]).await;

    let result = service(store.clone())
        .reconcile_role(RoleId::new(6), reconcile_input("tutor", &[(1, "R")]))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(*store.transactions_begun.lock().await, 0);
}

#[tokio::test]
async fn conflicting_desired_grants_are_rejected_before_lookup() {
    let store = Arc::new(FakeRoleStore::default());
    store.seed_role(8, "tutor", &[(1, "R")]).await;

    let result = service(store.clone())
        .reconcile_role(RoleId::new(8), reconcile_input("tutor", &[(1, "R"), (1, "W")]))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(*store.grant_lookups.lock().await, 0);
    assert_eq!(*store.transactions_begun.lock().await, 0);
    assert_eq!(store.active_grants(8).await, vec![grant(1, "R")]);
}

#[tokio::test]
async fn create_role_persists_initial_grants_and_detail_groups_them() {
    let store = Arc::new(FakeRoleStore::default());
    let service = service(store.clone());

    let created = service
        .create_role(CreateRoleInput {
            company_id: CompanyId::new(1),
            role_name: "coordinator".to_owned(),
            reg_by: "admin".to_owned(),
            grants: vec![
                GrantInput::new(2, "W"),
                GrantInput::new(1, "R"),
                GrantInput::new(42, "R"),
            ],
        })
        .await;
    let Ok(created) = created else {
        panic!("role creation failed");
    };

    let detail = service.role_detail(created.role_id).await;
    let Ok(detail) = detail else {
        panic!("role detail failed");
    };

    assert_eq!(detail.role.role_name.as_str(), "coordinator");
    let summary: Vec<(i64, &str, Vec<&str>)> = detail
        .permissions
        .iter()
        .map(|group| {
            (
                group.permission_id.as_i64(),
                group.display_name.as_str(),
                group.grant_types.iter().map(GrantType::as_str).collect(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, "Notices", vec!["R"]),
            (2, "Study plans", vec!["W"]),
            (42, "", vec!["R"]),
        ]
    );
}

#[tokio::test]
async fn delete_role_hides_role_and_grants() {
    let store = Arc::new(FakeRoleStore::default());
    store.seed_role(10, "tutor", &[(1, "R"), (2, "W")]).await;
    let service = service(store.clone());

    let deleted = service.delete_role(RoleId::new(10), "admin").await;
    assert!(deleted.is_ok());

    assert!(store.active_grants(10).await.is_empty());
    assert!(matches!(
        service.role_detail(RoleId::new(10)).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.delete_role(RoleId::new(10), "admin").await,
        Err(AppError::NotFound(_))
    ));
    let listed = service.list_roles(CompanyId::new(1)).await;
    assert_eq!(listed.map(|roles| roles.len()).ok(), Some(0));
}
