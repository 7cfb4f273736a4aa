//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::UserStatus;
use crate::role;

/// A registered user in the DocSense system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Email address (unique, stored lowercase).
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Argon2id password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Name of the role assigned to this user.
    pub role: String,
    /// Account approval status.
    pub status: UserStatus,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Check if this user holds the administrative role.
    pub fn is_superuser(&self) -> bool {
        self.role == role::SUPERUSER
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role name.
    pub role: String,
    /// Initial account status.
    pub status: UserStatus,
}

/// Personalization fields a user may change on their own profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfile {
    /// New username.
    pub username: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
}
