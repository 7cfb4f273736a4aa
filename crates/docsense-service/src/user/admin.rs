//! Admin user management: the account approval workflow, role changes,
//! and deletion with self-protection rules.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use docsense_auth::access;
use docsense_core::error::AppError;
use docsense_core::types::pagination::{PageRequest, PageResponse};
use docsense_database::repositories::role::RoleRepository;
use docsense_database::repositories::user::{UserRepository, UserStats};
use docsense_entity::role::SUPERUSER;
use docsense_entity::user::{User, UserStatus};

use crate::context::RequestContext;

/// Administrative operations over user accounts.
///
/// Self-protection rules are enforced here, before any mutation: an admin
/// cannot change their own role or delete their own account, and the last
/// superuser cannot be deleted.
#[derive(Debug, Clone)]
pub struct UserAdminService {
    user_repo: Arc<UserRepository>,
    role_repo: Arc<RoleRepository>,
}

impl UserAdminService {
    /// Creates a new user admin service.
    pub fn new(user_repo: Arc<UserRepository>, role_repo: Arc<RoleRepository>) -> Self {
        Self {
            user_repo,
            role_repo,
        }
    }

    /// List all users with aggregate stats for the dashboard.
    pub async fn list_users(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<(PageResponse<User>, UserStats), AppError> {
        access::require_admin(&ctx.role)?;
        let users = self.user_repo.find_all(&page).await?;
        let stats = self.user_repo.stats().await?;
        Ok((users, stats))
    }

    /// List accounts awaiting approval.
    pub async fn pending_users(&self, ctx: &RequestContext) -> Result<Vec<User>, AppError> {
        access::require_admin(&ctx.role)?;
        self.user_repo.find_pending().await
    }

    /// Approve a pending account.
    pub async fn approve_user(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
    ) -> Result<User, AppError> {
        access::require_admin(&ctx.role)?;

        let user = self.require_user(user_id).await?;
        match user.status {
            UserStatus::Active => {
                return Err(AppError::invalid_state("User is already approved"));
            }
            UserStatus::Rejected => {
                return Err(AppError::invalid_state("Cannot approve a rejected user"));
            }
            UserStatus::Pending => {}
        }

        let user = self
            .user_repo
            .transition_status(user_id, UserStatus::Pending, UserStatus::Active)
            .await?
            .ok_or_else(|| AppError::invalid_state("User is no longer awaiting approval"))?;

        info!(admin_id = %ctx.user_id, user_id = %user.id, "User approved");
        Ok(user)
    }

    /// Reject a pending account.
    pub async fn reject_user(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
    ) -> Result<User, AppError> {
        access::require_admin(&ctx.role)?;

        let user = self.require_user(user_id).await?;
        match user.status {
            UserStatus::Active => {
                return Err(AppError::invalid_state(
                    "Cannot reject an already approved user",
                ));
            }
            UserStatus::Rejected => {
                return Err(AppError::invalid_state("User is already rejected"));
            }
            UserStatus::Pending => {}
        }

        let user = self
            .user_repo
            .transition_status(user_id, UserStatus::Pending, UserStatus::Rejected)
            .await?
            .ok_or_else(|| AppError::invalid_state("User is no longer awaiting approval"))?;

        info!(admin_id = %ctx.user_id, user_id = %user.id, "User rejected");
        Ok(user)
    }

    /// Toggle approval: active accounts become pending, pending or
    /// rejected accounts become active (clearing the rejection).
    pub async fn toggle_approval(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
    ) -> Result<User, AppError> {
        access::require_admin(&ctx.role)?;

        let user = self.require_user(user_id).await?;
        let target = match user.status {
            UserStatus::Active => UserStatus::Pending,
            UserStatus::Pending | UserStatus::Rejected => UserStatus::Active,
        };

        let user = self
            .user_repo
            .transition_status(user_id, user.status, target)
            .await?
            .ok_or_else(|| AppError::invalid_state("User status changed concurrently"))?;

        info!(admin_id = %ctx.user_id, user_id = %user.id, status = %user.status, "User approval toggled");
        Ok(user)
    }

    /// Assign a different role to a user.
    pub async fn change_role(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        role_name: &str,
    ) -> Result<User, AppError> {
        access::require_admin(&ctx.role)?;

        if ctx.user_id == user_id {
            return Err(AppError::forbidden("Cannot change your own role"));
        }

        let role = self
            .role_repo
            .find_by_name(role_name)
            .await?
            .filter(|r| r.is_active)
            .ok_or_else(|| {
                AppError::validation("Invalid role. Role must exist and be active.")
            })?;

        self.require_user(user_id).await?;
        let user = self.user_repo.update_role(user_id, &role.name).await?;

        info!(admin_id = %ctx.user_id, user_id = %user.id, role = %user.role, "User role updated");
        Ok(user)
    }

    /// Permanently delete a user account.
    pub async fn delete_user(&self, ctx: &RequestContext, user_id: Uuid) -> Result<(), AppError> {
        access::require_admin(&ctx.role)?;

        if ctx.user_id == user_id {
            return Err(AppError::forbidden("Cannot delete your own account"));
        }

        let user = self.require_user(user_id).await?;
        if user.role == SUPERUSER {
            let remaining = self.user_repo.count_by_role(SUPERUSER).await?;
            if remaining <= 1 {
                return Err(AppError::invalid_state(
                    "Cannot delete the last superuser account",
                ));
            }
        }

        if !self.user_repo.delete(user_id).await? {
            return Err(AppError::not_found("User not found"));
        }

        info!(admin_id = %ctx.user_id, user_id = %user_id, "User deleted");
        Ok(())
    }

    async fn require_user(&self, user_id: Uuid) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
