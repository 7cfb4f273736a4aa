//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username.
    #[validate(length(min = 3, max = 30, message = "Username must be between 3 and 30 characters long"))]
    pub username: String,
    /// Email address.
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    /// Phone number.
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,
    /// Requested role name.
    pub role: Option<String>,
    /// Password.
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    /// Password confirmation.
    pub password_confirm: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token.
    pub refresh_token: String,
}

/// Personalization update request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    /// New username.
    pub username: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
}

/// Role creation request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRoleRequest {
    /// Role name.
    #[validate(length(min = 2, max = 20, message = "Role name must be between 2 and 20 characters long"))]
    pub name: String,
    /// Display name.
    #[validate(length(min = 2, max = 50, message = "Display name must be between 2 and 50 characters long"))]
    pub display_name: String,
    /// Description.
    #[validate(length(max = 200, message = "Description cannot exceed 200 characters"))]
    pub description: Option<String>,
    /// Permission names.
    pub permissions: Option<Vec<String>>,
}

/// Role update request (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    /// New display name.
    pub display_name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New permission names.
    pub permissions: Option<Vec<String>>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Role change request for a user (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangeUserRoleRequest {
    /// Role name to assign.
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
}

/// Body of a download request creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDownloadRequest {
    /// Why the caller needs the download.
    pub reason: String,
}

/// Admin decision on a download request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DecideRequest {
    /// "approve" or "reject".
    #[validate(length(min = 1, message = "Action is required"))]
    pub action: String,
    /// Download allowance when approving.
    pub max_downloads: Option<i64>,
    /// Reason when rejecting.
    pub reason: Option<String>,
}

/// Query parameters for document listing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocumentListQuery {
    /// Substring search.
    pub search: Option<String>,
    /// File type filter ("all" disables).
    #[serde(rename = "type")]
    pub file_type: Option<String>,
    /// Status filter ("all" disables).
    pub status: Option<String>,
    /// Sort column.
    pub sort_by: Option<String>,
    /// "asc" or "desc" (default).
    pub sort_order: Option<String>,
    /// Page number.
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
}

/// Query parameters for the admin download request listing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RequestListQuery {
    /// Status filter ("all" disables).
    pub status: Option<String>,
    /// Page number.
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
}

/// Query parameter for token downloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadQuery {
    /// The download token.
    pub token: Option<String>,
}
