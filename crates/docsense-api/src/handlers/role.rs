//! Role management handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use docsense_core::error::AppError;
use docsense_entity::role::{Permission, UpdateRole};
use docsense_service::role::CreateRoleInput;

use crate::dto::request::{CreateRoleRequest, UpdateRoleRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::handlers::validate_dto;
use crate::state::AppState;

/// GET /api/roles — all roles with derived user counts (admin).
pub async fn list_roles(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    docsense_auth::access::require_admin(&auth.role)?;
    let roles = state.role_service.list_roles().await?;
    Ok(Json(ApiResponse::ok(serde_json::json!({ "roles": roles }))))
}

/// GET /api/roles/active — assignable roles, public (registration form).
pub async fn active_roles(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let roles = state.role_service.active_roles().await?;
    let roles: Vec<serde_json::Value> = roles
        .into_iter()
        .map(|r| {
            serde_json::json!({
                "name": r.name,
                "display_name": r.display_name,
                "description": r.description,
            })
        })
        .collect();
    Ok(Json(ApiResponse::ok(serde_json::json!({ "roles": roles }))))
}

/// GET /api/roles/stats
pub async fn role_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let stats = state.role_service.role_stats(&auth).await?;
    Ok(Json(ApiResponse::ok(serde_json::json!({ "stats": stats }))))
}

/// POST /api/roles
pub async fn create_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>), ApiError> {
    validate_dto(&req)?;
    let permissions = req.permissions.map(parse_permissions).transpose()?;

    let role = state
        .role_service
        .create_role(
            &auth,
            CreateRoleInput {
                name: req.name,
                display_name: req.display_name,
                description: req.description,
                permissions,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Role created successfully",
            serde_json::json!({ "role": role }),
        )),
    ))
}

/// PUT /api/roles/{id}
pub async fn update_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let permissions = req.permissions.map(parse_permissions).transpose()?;

    let role = state
        .role_service
        .update_role(
            &auth,
            id,
            UpdateRole {
                display_name: req.display_name,
                description: req.description,
                permissions,
                is_active: req.is_active,
            },
        )
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Role updated successfully",
        serde_json::json!({ "role": role }),
    )))
}

/// DELETE /api/roles/{id}
pub async fn delete_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.role_service.delete_role(&auth, id).await?;
    Ok(Json(ApiResponse::message("Role deleted successfully")))
}

fn parse_permissions(names: Vec<String>) -> Result<Vec<Permission>, ApiError> {
    names.into_iter().map(|name| parse_permission(&name)).collect()
}

fn parse_permission(name: &str) -> Result<Permission, ApiError> {
    match name {
        "read" => Ok(Permission::Read),
        "write" => Ok(Permission::Write),
        "delete" => Ok(Permission::Delete),
        "admin" => Ok(Permission::Admin),
        "moderate" => Ok(Permission::Moderate),
        _ => Err(ApiError(AppError::validation(format!(
            "Invalid permission type: {name}"
        )))),
    }
}
