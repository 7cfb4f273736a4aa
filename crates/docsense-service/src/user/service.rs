//! User self-service: profile and personalization.

use std::sync::Arc;

use tracing::info;

use docsense_core::error::AppError;
use docsense_database::repositories::user::UserRepository;
use docsense_entity::user::{UpdateProfile, User};

use crate::context::RequestContext;

/// Profile operations for the authenticated user.
#[derive(Debug, Clone)]
pub struct UserService {
    user_repo: Arc<UserRepository>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Fetch the caller's profile.
    pub async fn get_profile(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Update the caller's personalization fields.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        update: UpdateProfile,
    ) -> Result<User, AppError> {
        if let Some(ref username) = update.username {
            let trimmed = username.trim();
            if trimmed.len() < 3 || trimmed.len() > 30 {
                return Err(AppError::validation(
                    "Username must be between 3 and 30 characters long",
                ));
            }
        }

        let user = self.user_repo.update_profile(ctx.user_id, &update).await?;
        info!(user_id = %ctx.user_id, "Profile updated");
        Ok(user)
    }
}
