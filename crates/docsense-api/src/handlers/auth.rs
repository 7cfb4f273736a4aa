//! Auth handlers — register, login, refresh, logout, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use docsense_core::error::AppError;
use docsense_service::auth::RegisterInput;

use crate::dto::request::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::{ApiResponse, LoginResponse, RefreshResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::handlers::validate_dto;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    validate_dto(&req)?;
    if req.password != req.password_confirm {
        return Err(ApiError(AppError::validation(
            "Password confirmation does not match password",
        )));
    }

    let user = state
        .auth_service
        .register(RegisterInput {
            username: req.username,
            email: req.email,
            phone: req.phone,
            role: req.role,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Registration successful; awaiting admin approval.",
            user.into(),
        )),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    validate_dto(&req)?;

    let result = state.auth_service.login(&req.email, &req.password).await?;

    Ok(Json(ApiResponse::with_message(
        "Login successful",
        LoginResponse {
            access_token: result.tokens.access_token,
            refresh_token: result.tokens.refresh_token,
            access_expires_at: result.tokens.access_expires_at,
            refresh_expires_at: result.tokens.refresh_expires_at,
            user: result.user.into(),
        },
    )))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<RefreshResponse>>, ApiError> {
    let (access_token, access_expires_at) =
        state.auth_service.refresh(&req.refresh_token).await?;

    Ok(Json(ApiResponse::ok(RefreshResponse {
        access_token,
        access_expires_at,
    })))
}

/// POST /api/auth/logout
///
/// Tokens are stateless; logout is client-side discard. The endpoint
/// exists so clients have a uniform call to make.
pub async fn logout(_auth: AuthUser) -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Logout successful"))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.auth_service.me(&auth).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}
