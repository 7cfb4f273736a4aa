//! Role entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// A capability grantable to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Read access to content.
    Read,
    /// Create and modify content.
    Write,
    /// Delete content.
    Delete,
    /// Administrative operations.
    Admin,
    /// Moderation capabilities.
    Moderate,
}

/// A role assignable to users.
///
/// Role names are unique case-insensitively and stored lowercase. The
/// per-role user count is not stored; it is derived at read time with a
/// `COUNT(*)` against the users table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Unique role identifier.
    pub id: Uuid,
    /// Unique role name (lowercase).
    pub name: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Permissions granted by this role.
    pub permissions: Json<Vec<Permission>>,
    /// Whether the role can be assigned.
    pub is_active: bool,
    /// System roles cannot be modified or deleted.
    pub is_system: bool,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
    /// When the role was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Check whether this role may be deleted.
    ///
    /// System roles and roles that still have users are protected.
    pub fn can_be_deleted(&self, user_count: u64) -> bool {
        !self.is_system && user_count == 0
    }
}

/// Data required to create a new role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    /// Role name (will be lowercased).
    pub name: String,
    /// Display name.
    pub display_name: String,
    /// Description.
    pub description: Option<String>,
    /// Granted permissions.
    pub permissions: Vec<Permission>,
    /// Whether the role can be assigned.
    pub is_active: bool,
    /// Whether this is a protected system role.
    pub is_system: bool,
}

/// Fields an admin may change on an existing role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRole {
    /// New display name.
    pub display_name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New permission set.
    pub permissions: Option<Vec<Permission>>,
    /// New active flag.
    pub is_active: Option<bool>,
}
