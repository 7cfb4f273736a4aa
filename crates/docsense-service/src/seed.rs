//! Idempotent startup seeding: system roles and the bootstrap superuser.

use std::sync::Arc;

use tracing::{info, warn};

use docsense_auth::password::PasswordHasher;
use docsense_core::config::auth::AuthConfig;
use docsense_core::error::AppError;
use docsense_database::repositories::role::RoleRepository;
use docsense_database::repositories::user::UserRepository;
use docsense_entity::role::{CreateRole, DEFAULT_ROLE, Permission, SUPERUSER};
use docsense_entity::user::{CreateUser, UserStatus};

/// Ensure the system roles exist and at least one superuser can log in.
pub async fn seed(
    role_repo: &Arc<RoleRepository>,
    user_repo: &Arc<UserRepository>,
    hasher: &Arc<PasswordHasher>,
    auth: &AuthConfig,
) -> Result<(), AppError> {
    seed_roles(role_repo).await?;
    seed_superuser(user_repo, hasher, auth).await?;
    Ok(())
}

async fn seed_roles(role_repo: &Arc<RoleRepository>) -> Result<(), AppError> {
    let defaults = [
        CreateRole {
            name: DEFAULT_ROLE.to_string(),
            display_name: "User".to_string(),
            description: Some("Standard user with basic access".to_string()),
            permissions: vec![Permission::Read],
            is_active: true,
            is_system: true,
        },
        CreateRole {
            name: SUPERUSER.to_string(),
            display_name: "Superuser".to_string(),
            description: Some("Administrator with full system access".to_string()),
            permissions: vec![
                Permission::Read,
                Permission::Write,
                Permission::Delete,
                Permission::Admin,
            ],
            is_active: true,
            is_system: true,
        },
        CreateRole {
            name: "moderator".to_string(),
            display_name: "Moderator".to_string(),
            description: Some("User with moderation capabilities".to_string()),
            permissions: vec![Permission::Read, Permission::Write, Permission::Moderate],
            is_active: true,
            is_system: false,
        },
        CreateRole {
            name: "editor".to_string(),
            display_name: "Editor".to_string(),
            description: Some("User with content editing permissions".to_string()),
            permissions: vec![Permission::Read, Permission::Write],
            is_active: true,
            is_system: false,
        },
    ];

    for data in defaults {
        if role_repo.find_by_name(&data.name).await?.is_none() {
            let role = role_repo.create(&data).await?;
            info!(role = %role.name, "Seeded role");
        }
    }
    Ok(())
}

async fn seed_superuser(
    user_repo: &Arc<UserRepository>,
    hasher: &Arc<PasswordHasher>,
    auth: &AuthConfig,
) -> Result<(), AppError> {
    if user_repo.count_by_role(SUPERUSER).await? > 0 {
        return Ok(());
    }

    let password_hash = hasher.hash_password(&auth.bootstrap_password)?;
    let user = user_repo
        .create(&CreateUser {
            username: auth.bootstrap_username.clone(),
            email: auth.bootstrap_email.clone(),
            phone: None,
            password_hash,
            role: SUPERUSER.to_string(),
            status: UserStatus::Active,
        })
        .await?;

    warn!(
        user_id = %user.id,
        username = %user.username,
        "Bootstrap superuser created; change its password immediately"
    );
    Ok(())
}
