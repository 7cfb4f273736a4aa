//! Role CRUD with derived user counts.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use docsense_auth::access;
use docsense_core::error::AppError;
use docsense_database::repositories::role::RoleRepository;
use docsense_database::repositories::user::UserRepository;
use docsense_entity::role::{CreateRole, Permission, Role, UpdateRole};

use crate::context::RequestContext;

/// A role together with its derived user count.
///
/// The count is computed at read time; nothing is cached or manually
/// invalidated.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RoleWithCount {
    /// The role row.
    #[serde(flatten)]
    pub role: Role,
    /// Number of users currently assigned this role.
    pub user_count: u64,
}

/// Input for creating a role.
#[derive(Debug, Clone)]
pub struct CreateRoleInput {
    /// Role name.
    pub name: String,
    /// Display name.
    pub display_name: String,
    /// Description.
    pub description: Option<String>,
    /// Granted permissions; defaults to read-only.
    pub permissions: Option<Vec<Permission>>,
}

/// Manages role definitions.
#[derive(Debug, Clone)]
pub struct RoleService {
    role_repo: Arc<RoleRepository>,
    user_repo: Arc<UserRepository>,
}

impl RoleService {
    /// Creates a new role service.
    pub fn new(role_repo: Arc<RoleRepository>, user_repo: Arc<UserRepository>) -> Self {
        Self {
            role_repo,
            user_repo,
        }
    }

    /// List every role with its derived user count.
    pub async fn list_roles(&self) -> Result<Vec<RoleWithCount>, AppError> {
        let roles = self.role_repo.find_all().await?;
        self.with_counts(roles).await
    }

    /// List assignable roles (used by the registration form).
    pub async fn active_roles(&self) -> Result<Vec<Role>, AppError> {
        self.role_repo.find_active().await
    }

    /// Create a new role.
    pub async fn create_role(
        &self,
        ctx: &RequestContext,
        input: CreateRoleInput,
    ) -> Result<Role, AppError> {
        access::require_admin(&ctx.role)?;

        let name = input.name.trim().to_string();
        if name.len() < 2 || name.len() > 20 {
            return Err(AppError::validation(
                "Role name must be between 2 and 20 characters long",
            ));
        }
        let display_name = input.display_name.trim().to_string();
        if display_name.len() < 2 || display_name.len() > 50 {
            return Err(AppError::validation(
                "Display name must be between 2 and 50 characters long",
            ));
        }
        if let Some(ref description) = input.description {
            if description.len() > 200 {
                return Err(AppError::validation(
                    "Description cannot exceed 200 characters",
                ));
            }
        }

        let role = self
            .role_repo
            .create(&CreateRole {
                name,
                display_name,
                description: input.description,
                permissions: input.permissions.unwrap_or_else(|| vec![Permission::Read]),
                is_active: true,
                is_system: false,
            })
            .await?;

        info!(admin_id = %ctx.user_id, role = %role.name, "Role created");
        Ok(role)
    }

    /// Update a non-system role.
    pub async fn update_role(
        &self,
        ctx: &RequestContext,
        role_id: Uuid,
        update: UpdateRole,
    ) -> Result<Role, AppError> {
        access::require_admin(&ctx.role)?;

        let role = self.require_role(role_id).await?;
        if role.is_system {
            return Err(AppError::invalid_state("Cannot modify system roles"));
        }

        let role = self.role_repo.update(role_id, &update).await?;
        info!(admin_id = %ctx.user_id, role = %role.name, "Role updated");
        Ok(role)
    }

    /// Delete a role that is not a system role and has no users.
    pub async fn delete_role(&self, ctx: &RequestContext, role_id: Uuid) -> Result<(), AppError> {
        access::require_admin(&ctx.role)?;

        let role = self.require_role(role_id).await?;
        let user_count = self.user_repo.count_by_role(&role.name).await?;
        if !role.can_be_deleted(user_count) {
            let message = if role.is_system {
                "Cannot delete system roles"
            } else {
                "Cannot delete role with existing users. Please reassign or remove all users with this role first."
            };
            return Err(AppError::invalid_state(message));
        }

        self.role_repo.delete(role_id).await?;
        info!(admin_id = %ctx.user_id, role = %role.name, "Role deleted");
        Ok(())
    }

    /// Per-role statistics for the admin dashboard.
    pub async fn role_stats(&self, ctx: &RequestContext) -> Result<Vec<RoleWithCount>, AppError> {
        access::require_admin(&ctx.role)?;
        let roles = self.role_repo.find_all().await?;
        self.with_counts(roles).await
    }

    async fn with_counts(&self, roles: Vec<Role>) -> Result<Vec<RoleWithCount>, AppError> {
        let mut out = Vec::with_capacity(roles.len());
        for role in roles {
            let user_count = self.user_repo.count_by_role(&role.name).await?;
            out.push(RoleWithCount { role, user_count });
        }
        Ok(out)
    }

    async fn require_role(&self, role_id: Uuid) -> Result<Role, AppError> {
        self.role_repo
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::not_found("Role not found"))
    }
}
