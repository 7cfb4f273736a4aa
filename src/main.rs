//! DocSense server — document management with approval-gated downloads.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use docsense_core::config::AppConfig;

#[tokio::main]
async fn main() {
    let config_path =
        std::env::var("DOCSENSE_CONFIG").unwrap_or_else(|_| "config/default".to_string());

    let config = match AppConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e:#}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting DocSense v{}", env!("CARGO_PKG_VERSION"));

    // Database pool + migrations.
    let db_pool = docsense_database::connection::create_pool(&config.database).await?;
    docsense_database::migration::run_migrations(&db_pool).await?;

    // Content store.
    let uploads_root = format!("{}/uploads/documents", config.storage.data_root);
    let store: Arc<dyn docsense_storage::ContentStore> =
        Arc::new(docsense_storage::LocalStore::new(uploads_root).await?);

    // Repositories.
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

    // Auth primitives.
    let password_hasher = Arc::new(docsense_auth::password::PasswordHasher::new());
    let jwt_encoder = Arc::new(docsense_auth::jwt::JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(docsense_auth::jwt::JwtDecoder::new(&config.auth));

    // Seed system roles and the bootstrap superuser.
    docsense_service::seed::seed(&role_repo, &user_repo, &password_hasher, &config.auth).await?;

    // Services.
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
    let token_issuer = docsense_service::download::TokenIssuer::new(Arc::clone(&download_repo));
    let download_service = Arc::new(docsense_service::download::DownloadRequestService::new(
        Arc::clone(&download_repo),
        Arc::clone(&document_repo),
        token_issuer,
    ));

    let app_state = docsense_api::state::AppState {
        config: Arc::new(config.clone()),
        db_pool: db_pool.clone(),
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

    let app = docsense_api::router::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("DocSense server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("DocSense server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
