//! Registration, login, and token refresh.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use docsense_auth::jwt::{JwtDecoder, JwtEncoder, TokenPair};
use docsense_auth::password::PasswordHasher;
use docsense_core::error::AppError;
use docsense_database::repositories::role::RoleRepository;
use docsense_database::repositories::user::UserRepository;
use docsense_entity::role::DEFAULT_ROLE;
use docsense_entity::user::{CreateUser, User, UserStatus};

use crate::context::RequestContext;

/// Input for user registration.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Requested role name; defaults to `user`.
    pub role: Option<String>,
    /// Plaintext password.
    pub password: String,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// The authenticated user.
    pub user: User,
    /// Freshly issued token pair.
    pub tokens: TokenPair,
}

/// Handles registration, login, and token refresh.
#[derive(Debug, Clone)]
pub struct AuthService {
    user_repo: Arc<UserRepository>,
    role_repo: Arc<RoleRepository>,
    hasher: Arc<PasswordHasher>,
    jwt_encoder: Arc<JwtEncoder>,
    jwt_decoder: Arc<JwtDecoder>,
    password_min_length: usize,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        role_repo: Arc<RoleRepository>,
        hasher: Arc<PasswordHasher>,
        jwt_encoder: Arc<JwtEncoder>,
        jwt_decoder: Arc<JwtDecoder>,
        password_min_length: usize,
    ) -> Self {
        Self {
            user_repo,
            role_repo,
            hasher,
            jwt_encoder,
            jwt_decoder,
            password_min_length,
        }
    }

    /// Register a new account. The account starts `pending` and cannot log
    /// in until an admin approves it.
    pub async fn register(&self, input: RegisterInput) -> Result<User, AppError> {
        let username = input.username.trim().to_string();
        if username.len() < 3 || username.len() > 30 {
            return Err(AppError::validation(
                "Username must be between 3 and 30 characters long",
            ));
        }

        let email = input.email.trim().to_lowercase();
        if !is_plausible_email(&email) {
            return Err(AppError::validation("Please enter a valid email address"));
        }

        let phone = input.phone.trim().to_string();
        if !is_plausible_phone(&phone) {
            return Err(AppError::validation("Please enter a valid phone number"));
        }

        if input.password.len() < self.password_min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.password_min_length
            )));
        }

        let role_name = input
            .role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ROLE)
            .to_lowercase();
        let role = self
            .role_repo
            .find_by_name(&role_name)
            .await?
            .filter(|r| r.is_active)
            .ok_or_else(|| {
                AppError::validation("Invalid role. Role must exist and be active.")
            })?;

        let password_hash = self.hasher.hash_password(&input.password)?;

        let user = self
            .user_repo
            .create(&CreateUser {
                username,
                email,
                phone: Some(phone),
                password_hash,
                role: role.name,
                status: UserStatus::Pending,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered, awaiting approval");
        Ok(user)
    }

    /// Log in with email and password, returning a token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AppError> {
        let user = self
            .user_repo
            .find_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

        match user.status {
            UserStatus::Pending => {
                return Err(AppError::forbidden("Account awaiting approval"));
            }
            UserStatus::Rejected => {
                return Err(AppError::forbidden("Account has been rejected"));
            }
            UserStatus::Active => {}
        }

        if !self.hasher.verify_password(password, &user.password_hash)? {
            return Err(AppError::unauthorized("Invalid email or password"));
        }

        self.user_repo.update_last_login(user.id).await?;

        let tokens = self
            .jwt_encoder
            .generate_token_pair(user.id, &user.role, &user.username)?;

        info!(user_id = %user.id, username = %user.username, "User logged in");
        Ok(LoginResult { user, tokens })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The account must still be active: approval can be revoked between
    /// refreshes.
    pub async fn refresh(
        &self,
        refresh_token: &str,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let claims = self.jwt_decoder.decode_refresh_token(refresh_token)?;

        let user = self
            .user_repo
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

        if !user.status.can_login() {
            return Err(AppError::forbidden(
                "Account is not approved or has been rejected",
            ));
        }

        self.jwt_encoder
            .generate_access_token(user.id, &user.role, &user.username)
    }

    /// Current user's profile.
    pub async fn me(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}

/// Minimal email shape check; uniqueness and deliverability are not our
/// concern here.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Phone numbers: optional leading +, then 7 to 16 digits.
fn is_plausible_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    (7..=16).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_plausible_email("alice@example.com"));
        assert!(!is_plausible_email("alice"));
        assert!(!is_plausible_email("alice@nodot"));
        assert!(!is_plausible_email("@example.com"));
    }

    #[test]
    fn phone_shape() {
        assert!(is_plausible_phone("+15551234567"));
        assert!(is_plausible_phone("5551234567"));
        assert!(!is_plausible_phone("555-123"));
        assert!(!is_plausible_phone("12"));
    }
}
