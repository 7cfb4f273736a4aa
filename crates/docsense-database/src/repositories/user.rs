//! User repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use docsense_core::error::{AppError, ErrorKind};
use docsense_core::result::AppResult;
use docsense_core::types::pagination::{PageRequest, PageResponse};
use docsense_entity::role::SUPERUSER;
use docsense_entity::user::{CreateUser, UpdateProfile, User, UserStatus};

/// Aggregate counts over the user table.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UserStats {
    /// All registered users.
    pub total: u64,
    /// Users with active (approved) accounts.
    pub approved: u64,
    /// Users awaiting approval.
    pub pending: u64,
    /// Rejected users.
    pub rejected: u64,
    /// Users holding the superuser role.
    pub superusers: u64,
}

/// Repository for user CRUD and query operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ? COLLATE NOCASE")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    /// Find a user by username (case-insensitive).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ? COLLATE NOCASE")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    /// List all users, newest first.
    pub async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<User>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))?;

        Ok(PageResponse::new(
            users,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// List users awaiting approval, newest first.
    pub async fn find_pending(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE status = 'pending' ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list pending users", e))
    }

    /// Create a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let now = Utc::now();
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, email, phone, password_hash, role, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.username)
        .bind(data.email.to_lowercase())
        .bind(&data.phone)
        .bind(&data.password_hash)
        .bind(&data.role)
        .bind(data.status)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                if db_err.message().contains("users.email") {
                    AppError::conflict("User with this email already exists")
                } else {
                    AppError::conflict(format!("Username '{}' already exists", data.username))
                }
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })
    }

    /// Update a user's personalization fields.
    pub async fn update_profile(&self, user_id: Uuid, data: &UpdateProfile) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET username = COALESCE(?, username), \
                              phone = COALESCE(?, phone), \
                              updated_at = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(&data.username)
        .bind(&data.phone)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::conflict("Username already taken")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to update user", e),
        })?
        .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Transition a user's account status.
    ///
    /// The `from` guard makes the precondition check atomic with the
    /// mutation; `None` is returned when the user was not in `from`.
    pub async fn transition_status(
        &self,
        user_id: Uuid,
        from: UserStatus,
        to: UserStatus,
    ) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET status = ?, updated_at = ? WHERE id = ? AND status = ? RETURNING *",
        )
        .bind(to)
        .bind(Utc::now())
        .bind(user_id)
        .bind(from)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update user status", e))
    }

    /// Update a user's role.
    pub async fn update_role(&self, user_id: Uuid, role: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET role = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(role)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update user role", e))?
        .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Stamp a successful login.
    pub async fn update_last_login(&self, user_id: Uuid) -> AppResult<()> {
        let now = Utc::now();
        sqlx::query("UPDATE users SET last_login_at = ?, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(now)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update last login", e)
            })?;
        Ok(())
    }

    /// Delete a user by ID.
    pub async fn delete(&self, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete user", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Count users holding a given role (derived read-time aggregate).
    pub async fn count_by_role(&self, role: &str) -> AppResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ? COLLATE NOCASE")
                .bind(role)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count users by role", e)
                })?;
        Ok(count as u64)
    }

    /// Aggregate user statistics for the admin dashboard.
    pub async fn stats(&self) -> AppResult<UserStats> {
        let row: (i64, i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COALESCE(SUM(status = 'active'), 0), \
                    COALESCE(SUM(status = 'pending'), 0), \
                    COALESCE(SUM(status = 'rejected'), 0), \
                    COALESCE(SUM(role = ?), 0) \
             FROM users",
        )
        .bind(SUPERUSER)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to compute user stats", e))?;

        Ok(UserStats {
            total: row.0 as u64,
            approved: row.1 as u64,
            pending: row.2 as u64,
            rejected: row.3 as u64,
            superusers: row.4 as u64,
        })
    }
}
