//! Application state shared across all handlers and extractors.

use std::sync::Arc;

use sqlx::SqlitePool;

use docsense_auth::jwt::{JwtDecoder, JwtEncoder};
use docsense_auth::password::PasswordHasher;
use docsense_core::config::AppConfig;
use docsense_database::repositories::document::DocumentRepository;
use docsense_database::repositories::download_request::DownloadRequestRepository;
use docsense_database::repositories::role::RoleRepository;
use docsense_database::repositories::user::UserRepository;
use docsense_service::auth::AuthService;
use docsense_service::document::{DocumentService, UploadService};
use docsense_service::download::DownloadRequestService;
use docsense_service::role::RoleService;
use docsense_service::user::{UserAdminService, UserService};
use docsense_storage::ContentStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// SQLite connection pool.
    pub db_pool: SqlitePool,
    /// Content store for document bytes.
    pub store: Arc<dyn ContentStore>,

    /// JWT token encoder.
    pub jwt_encoder: Arc<JwtEncoder>,
    /// JWT token decoder and validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Password hasher (Argon2id).
    pub password_hasher: Arc<PasswordHasher>,

    /// User repository.
    pub user_repo: Arc<UserRepository>,
    /// Role repository.
    pub role_repo: Arc<RoleRepository>,
    /// Document repository.
    pub document_repo: Arc<DocumentRepository>,
    /// Download request repository (the ledger).
    pub download_repo: Arc<DownloadRequestRepository>,

    /// Auth service.
    pub auth_service: Arc<AuthService>,
    /// User self-service.
    pub user_service: Arc<UserService>,
    /// Admin user management.
    pub user_admin_service: Arc<UserAdminService>,
    /// Role management.
    pub role_service: Arc<RoleService>,
    /// Document metadata and content.
    pub document_service: Arc<DocumentService>,
    /// Document uploads.
    pub upload_service: Arc<UploadService>,
    /// Download request workflow.
    pub download_service: Arc<DownloadRequestService>,
}
