//! Admin handlers: user approval workflow, user management, and the
//! download-request decision endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use docsense_core::error::AppError;
use docsense_entity::download::RequestStatus;
use docsense_service::download::Decision;

use crate::dto::request::{ChangeUserRoleRequest, DecideRequest, RequestListQuery};
use crate::dto::response::{
    ApiResponse, DecisionResponse, DownloadRequestResponse, UserResponse,
};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::handlers::validate_dto;
use crate::state::AppState;

/// GET /api/admin/requests — accounts awaiting approval.
pub async fn pending_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let users = state.user_admin_service.pending_users(&auth).await?;
    let count = users.len();
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(Json(ApiResponse::ok(serde_json::json!({
        "users": users,
        "count": count,
    }))))
}

/// GET /api/admin/users — all users with stats.
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let (users, stats) = state
        .user_admin_service
        .list_users(&auth, params.into_page_request())
        .await?;
    let users = users.map(UserResponse::from);

    Ok(Json(ApiResponse::ok(serde_json::json!({
        "users": users,
        "stats": stats,
    }))))
}

/// POST /api/admin/requests/{id}/approve
pub async fn approve_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.user_admin_service.approve_user(&auth, id).await?;
    Ok(Json(ApiResponse::with_message(
        "User approved successfully",
        user.into(),
    )))
}

/// POST /api/admin/requests/{id}/reject
pub async fn reject_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.user_admin_service.reject_user(&auth, id).await?;
    Ok(Json(ApiResponse::with_message(
        "User rejected successfully",
        user.into(),
    )))
}

/// PUT /api/admin/users/{id}/toggle-approval
pub async fn toggle_user_approval(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.user_admin_service.toggle_approval(&auth, id).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// PUT /api/admin/users/{id}/role
pub async fn change_user_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeUserRoleRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    validate_dto(&req)?;
    let user = state
        .user_admin_service
        .change_role(&auth, id, &req.role)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "User role updated successfully",
        user.into(),
    )))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.user_admin_service.delete_user(&auth, id).await?;
    Ok(Json(ApiResponse::message("User deleted successfully")))
}

/// GET /api/admin/download-requests
pub async fn list_download_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let page = PaginationParams {
        page: query.page,
        limit: query.limit,
    }
    .into_page_request();

    let status = match query.status.as_deref() {
        None | Some("all") | Some("") => None,
        Some(s) => Some(parse_request_status(s)?),
    };

    let requests = state
        .download_service
        .list_requests(&auth, status, page)
        .await?;
    let requests = requests.map(DownloadRequestResponse::from);

    Ok(Json(ApiResponse::ok(
        serde_json::json!({ "requests": requests }),
    )))
}

/// PATCH /api/admin/download-requests/{id}
pub async fn decide_download_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<DecideRequest>,
) -> Result<Json<ApiResponse<DecisionResponse>>, ApiError> {
    validate_dto(&req)?;

    let decision = match req.action.as_str() {
        "approve" => Decision::Approve {
            max_downloads: req.max_downloads,
        },
        "reject" => Decision::Reject { reason: req.reason },
        other => {
            return Err(ApiError(AppError::validation(format!(
                "Invalid action: {other}. Expected 'approve' or 'reject'."
            ))));
        }
    };

    let request = state.download_service.decide(&auth, id, decision).await?;

    Ok(Json(ApiResponse::with_message(
        format!("Download request {} successfully", request.status),
        DecisionResponse {
            request_id: request.id,
            status: request.status,
            download_token: request.download_token,
        },
    )))
}

fn parse_request_status(s: &str) -> Result<RequestStatus, ApiError> {
    s.parse::<RequestStatus>().map_err(ApiError)
}
