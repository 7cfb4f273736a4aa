//! Role repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::types::Json;
use uuid::Uuid;

use docsense_core::error::{AppError, ErrorKind};
use docsense_core::result::AppResult;
use docsense_entity::role::{CreateRole, Role, UpdateRole};

/// Repository for role CRUD and derived user-count queries.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: SqlitePool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a role by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role", e))
    }

    /// Find a role by name (case-insensitive).
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = ? COLLATE NOCASE")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find role by name", e)
            })
    }

    /// List all roles ordered by display name.
    pub async fn find_all(&self) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY display_name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list roles", e))
    }

    /// List assignable roles ordered by display name.
    pub async fn find_active(&self) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE is_active = TRUE ORDER BY display_name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list active roles", e))
    }

    /// Create a new role. Names are stored lowercase.
    pub async fn create(&self, data: &CreateRole) -> AppResult<Role> {
        let now = Utc::now();
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (id, name, display_name, description, permissions, is_active, is_system, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.name.to_lowercase())
        .bind(&data.display_name)
        .bind(&data.description)
        .bind(Json(&data.permissions))
        .bind(data.is_active)
        .bind(data.is_system)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::conflict("Role with this name already exists")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create role", e),
        })
    }

    /// Update mutable role fields.
    pub async fn update(&self, id: Uuid, data: &UpdateRole) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "UPDATE roles SET display_name = COALESCE(?, display_name), \
                              description = COALESCE(?, description), \
                              permissions = COALESCE(?, permissions), \
                              is_active = COALESCE(?, is_active), \
                              updated_at = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(&data.display_name)
        .bind(&data.description)
        .bind(data.permissions.as_ref().map(Json))
        .bind(data.is_active)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update role", e))?
        .ok_or_else(|| AppError::not_found("Role not found"))
    }

    /// Delete a role by ID.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete role", e))?;
        Ok(result.rows_affected() > 0)
    }
}
