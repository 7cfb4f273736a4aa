//! Shared test helpers: a fully wired application over a temp-file
//! SQLite database and temp-dir content store.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use bytes::Bytes;
use http::{Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use docsense_api::state::AppState;
use docsense_core::config::AppConfig;
use docsense_entity::document::{CreateDocument, Document, DocumentStatus};
use docsense_entity::user::{CreateUser, UserStatus};
use docsense_storage::ContentStore;

/// Email and password of the seeded bootstrap superuser.
pub const ADMIN_EMAIL: &str = "admin@docsense.local";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Test application context.
pub struct TestApp {
    /// The Axum router for making test requests.
    pub router: Router,
    /// Full application state for direct service/repo access.
    pub state: AppState,
    /// Keeps the temp database and storage alive for the test.
    _tmp: TempDir,
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Parsed JSON body (Null for non-JSON responses).
    pub body: Value,
}

impl TestApp {
    /// Create a fully wired test application.
    pub async fn new() -> Self {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::load("does/not/exist").expect("Failed to build config");
        config.database.path = tmp
            .path()
            .join("docsense.db")
            .to_string_lossy()
            .into_owned();
        config.storage.data_root = tmp.path().to_string_lossy().into_owned();
        config.auth.jwt_secret = "test-secret".into();

        let db_pool = docsense_database::connection::create_pool(&config.database)
            .await
            .expect("Failed to open test database");
        docsense_database::migration::run_migrations(&db_pool)
            .await
            .expect("Failed to run migrations");

        let store: Arc<dyn ContentStore> = Arc::new(
            docsense_storage::LocalStore::new(tmp.path().join("uploads"))
                .await
                .expect("Failed to init storage"),
        );

        let user_repo = Arc::new(docsense_database::repositories::user::UserRepository::new(
            db_pool.clone(),
        ));
        let role_repo = Arc::new(docsense_database::repositories::role::RoleRepository::new(
            db_pool.clone(),
        ));
        let document_repo = Arc::new(
            docsense_database::repositories::document::DocumentRepository::new(db_pool.clone()),
        );
        let download_repo = Arc::new(
            docsense_database::repositories::download_request::DownloadRequestRepository::new(
                db_pool.clone(),
            ),
        );

        let password_hasher = Arc::new(docsense_auth::password::PasswordHasher::new());
        let jwt_encoder = Arc::new(docsense_auth::jwt::JwtEncoder::new(&config.auth));
        let jwt_decoder = Arc::new(docsense_auth::jwt::JwtDecoder::new(&config.auth));

        docsense_service::seed::seed(&role_repo, &user_repo, &password_hasher, &config.auth)
            .await
            .expect("Failed to seed");

        let auth_service = Arc::new(docsense_service::auth::AuthService::new(
            Arc::clone(&user_repo),
            Arc::clone(&role_repo),
            Arc::clone(&password_hasher),
            Arc::clone(&jwt_encoder),
            Arc::clone(&jwt_decoder),
            config.auth.password_min_length,
        ));
        let user_service = Arc::new(docsense_service::user::UserService::new(Arc::clone(
            &user_repo,
        )));
        let user_admin_service = Arc::new(docsense_service::user::UserAdminService::new(
            Arc::clone(&user_repo),
            Arc::clone(&role_repo),
        ));
        let role_service = Arc::new(docsense_service::role::RoleService::new(
            Arc::clone(&role_repo),
            Arc::clone(&user_repo),
        ));
        let document_service = Arc::new(docsense_service::document::DocumentService::new(
            Arc::clone(&document_repo),
            Arc::clone(&store),
        ));
        let upload_service = Arc::new(docsense_service::document::UploadService::new(
            Arc::clone(&document_repo),
            Arc::clone(&store),
        ));
        let token_issuer =
            docsense_service::download::TokenIssuer::new(Arc::clone(&download_repo));
        let download_service = Arc::new(docsense_service::download::DownloadRequestService::new(
            Arc::clone(&download_repo),
            Arc::clone(&document_repo),
            token_issuer,
        ));

        let state = AppState {
            config: Arc::new(config),
            db_pool,
            store,
            jwt_encoder,
            jwt_decoder,
            password_hasher,
            user_repo,
            role_repo,
            document_repo,
            download_repo,
            auth_service,
            user_service,
            user_admin_service,
            role_service,
            document_service,
            upload_service,
            download_service,
        };

        let router = docsense_api::router::build_router(state.clone());

        Self {
            router,
            state,
            _tmp: tmp,
        }
    }

    /// Create an active user directly, returning their ID.
    pub async fn create_active_user(&self, username: &str, password: &str, role: &str) -> Uuid {
        let hash = self
            .state
            .password_hasher
            .hash_password(password)
            .expect("Failed to hash password");

        self.state
            .user_repo
            .create(&CreateUser {
                username: username.to_string(),
                email: format!("{username}@test.local"),
                phone: Some("+15550000000".to_string()),
                password_hash: hash,
                role: role.to_string(),
                status: UserStatus::Active,
            })
            .await
            .expect("Failed to create test user")
            .id
    }

    /// Create a document row plus its stored bytes, returning the entity.
    pub async fn create_document(&self, owner: Uuid, title: &str, is_public: bool) -> Document {
        let content = Bytes::from_static(b"confidential document body");
        let filename = format!("{}-{title}.txt", Uuid::new_v4());
        self.state
            .store
            .write(&filename, content.clone())
            .await
            .expect("Failed to store test file");

        self.state
            .document_repo
            .create(&CreateDocument {
                title: title.to_string(),
                original_name: format!("{title}.txt"),
                filename,
                file_type: "txt".to_string(),
                mime_type: "text/plain".to_string(),
                file_size: content.len() as i64,
                content: String::from_utf8_lossy(&content).into_owned(),
                uploaded_by: owner,
                status: DocumentStatus::Processed,
                is_public,
                tags: vec!["test".to_string()],
            })
            .await
            .expect("Failed to create test document")
    }

    /// Login and return the JWT access token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self.request("POST", "/api/auth/login", Some(body), None).await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.body["data"]["access_token"]
            .as_str()
            .expect("No access_token in login response")
            .to_string()
    }

    /// Login as the seeded bootstrap superuser.
    pub async fn login_admin(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Make a JSON HTTP request to the test app.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Make a raw HTTP request (for multipart and byte-stream endpoints).
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 10 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Download a token-gated document, returning status and raw bytes.
    pub async fn download(&self, token_query: &str, auth_token: &str) -> (StatusCode, Bytes) {
        let req = Request::builder()
            .method("GET")
            .uri(format!("/api/documents/download?token={token_query}"))
            .header("Authorization", format!("Bearer {auth_token}"))
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 10 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        (status, body)
    }
}
