use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use learnhub_application::{CreateRoleInput, GrantInput, ReconcileRoleInput};
use learnhub_core::CompanyId;
use learnhub_domain::RoleId;

use crate::dto::{
    CreateRoleRequest, DeleteRoleQuery, GenericMessageResponse, RoleDetailResponse, RoleResponse,
    UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;


pub async fn list_roles_handler(
    State(state): State<AppState>,
    Path(company_id): Path<i64>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .role_admin_service
        .list_roles(CompanyId::new(company_id))
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Path(company_id): Path<i64>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .role_admin_service
        .create_role(CreateRoleInput {
            company_id: CompanyId::new(company_id),
            role_name: payload.role_name,
            reg_by: payload.reg_by,
            grants: payload.grants.into_iter().map(GrantInput::from).collect(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn role_detail_handler(
    State(state): State<AppState>,
    Path(role_id): Path<i64>,
) -> ApiResult<Json<RoleDetailResponse>> {
    let detail = state
        .role_admin_service
        .role_detail(RoleId::new(role_id))
        .await?;

    Ok(Json(RoleDetailResponse::from(detail)))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<i64>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<GenericMessageResponse>> {
    let completed = state
        .role_admin_service
        .reconcile_role(
            RoleId::new(role_id),
            ReconcileRoleInput {
                role_name: payload.role_name,
                updater_name: payload.updater_name,
                grants: payload.grants.into_iter().map(GrantInput::from).collect(),
            },
        )
        .await?;

    Ok(Json(GenericMessageResponse {
        message: completed.to_string(),
    }))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<i64>,
    Query(query): Query<DeleteRoleQuery>,
) -> ApiResult<StatusCode> {
    state
        .role_admin_service
        .delete_role(RoleId::new(role_id), query.deleted_by.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
