//! SQLite connection pool management.

use std::path::Path;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;

use docsense_core::config::DatabaseConfig;
use docsense_core::error::{AppError, ErrorKind};

/// Create a connection pool for the configured SQLite database.
///
/// Enables WAL journaling so readers do not block on writers, and a busy
/// timeout so concurrent writers queue instead of failing immediately.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, AppError> {
    if let Some(parent) = Path::new(&config.path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to create database directory: {}", parent.display()),
                    e,
                )
            })?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .connect_with(options)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to open database at '{}': {e}", config.path),
                e,
            )
        })?;

    info!(path = %config.path, "Database connected");
    Ok(pool)
}
