//! Route definitions for the DocSense HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`. The
//! router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(role_routes())
        .merge(document_routes())
        .merge(admin_routes())
        .route("/health", get(handlers::health::health_check));

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Auth endpoints: register, login, refresh, logout, me.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
}

/// User self-service endpoints.
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(handlers::user::get_profile))
        .route("/users/personalize", put(handlers::user::update_profile))
}

/// Role listing and management.
fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/roles/active", get(handlers::role::active_roles))
        .route("/roles", get(handlers::role::list_roles))
        .route("/roles/stats", get(handlers::role::role_stats))
        .route("/roles", post(handlers::role::create_role))
        .route("/roles/{id}", put(handlers::role::update_role))
        .route("/roles/{id}", delete(handlers::role::delete_role))
}

/// Document CRUD and the download-request workflow.
fn document_routes() -> Router<AppState> {
    Router::new()
        .route("/documents/upload", post(handlers::document::upload_document))
        .route("/documents", get(handlers::document::list_documents))
        .route(
            "/documents/download",
            get(handlers::document::download_document),
        )
        .route("/documents/{id}", get(handlers::document::get_document))
        .route(
            "/documents/{id}",
            delete(handlers::document::delete_document),
        )
        .route(
            "/documents/{id}/view",
            get(handlers::document::view_document),
        )
        .route(
            "/documents/{id}/download-status",
            get(handlers::document::download_status),
        )
        .route(
            "/documents/{id}/request-download",
            post(handlers::document::request_download),
        )
}

/// Admin-only endpoints (role enforced by the services).
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/requests", get(handlers::admin::pending_users))
        .route("/admin/users", get(handlers::admin::list_users))
        .route(
            "/admin/requests/{id}/approve",
            post(handlers::admin::approve_user),
        )
        .route(
            "/admin/requests/{id}/reject",
            post(handlers::admin::reject_user),
        )
        .route(
            "/admin/users/{id}/toggle-approval",
            put(handlers::admin::toggle_user_approval),
        )
        .route(
            "/admin/users/{id}/role",
            put(handlers::admin::change_user_role),
        )
        .route("/admin/users/{id}", delete(handlers::admin::delete_user))
        .route(
            "/admin/download-requests",
            get(handlers::admin::list_download_requests),
        )
        .route(
            "/admin/download-requests/{id}",
            patch(handlers::admin::decide_download_request),
        )
}

/// Build the CORS layer from configuration.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    use tower_http::cors::Any;

    let origins = &state.config.server.allowed_origins;
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<axum::http::HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
