//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docsense_entity::document::Document;
use docsense_entity::download::{DownloadRequest, RequestStatus};
use docsense_entity::user::User;
use docsense_service::download::DownloadStatus;

/// Uniform success envelope: `{"success": true, "message"?, "data"?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Always `true` for successful responses.
    pub success: bool,
    /// Optional human-readable message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Success with data.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Success with data and message.
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Success with message only.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Role name.
    pub role: String,
    /// Account status.
    pub status: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Last login time.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            phone: user.phone,
            role: user.role,
            status: user.status.to_string(),
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Login response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiry.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiry.
    pub refresh_expires_at: DateTime<Utc>,
    /// The logged-in user.
    pub user: UserResponse,
}

/// Refresh response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New access token.
    pub access_token: String,
    /// Its expiry.
    pub access_expires_at: DateTime<Utc>,
}

/// Public view of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    /// Document ID.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// File extension.
    pub file_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Human-readable size.
    pub formatted_size: String,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
    /// Processing status.
    pub status: String,
    /// Uploader's user ID.
    pub uploaded_by: Uuid,
    /// Public visibility.
    pub is_public: bool,
    /// Aggregate download count.
    pub download_count: i64,
    /// Last access time.
    pub last_accessed: Option<DateTime<Utc>>,
    /// Tags.
    pub tags: Vec<String>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            formatted_size: doc.formatted_size(),
            id: doc.id,
            title: doc.title,
            file_type: doc.file_type,
            file_size: doc.file_size,
            uploaded_at: doc.created_at,
            status: doc.status.to_string(),
            uploaded_by: doc.uploaded_by,
            is_public: doc.is_public,
            download_count: doc.download_count,
            last_accessed: doc.last_accessed,
            tags: doc.tags.0,
        }
    }
}

/// Download status report. `status` is `"none"` when no request exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadStatusResponse {
    /// Stored status or the synthetic `"none"`.
    pub status: String,
    /// Issued token, when approved.
    pub download_token: Option<String>,
    /// Downloads consumed.
    pub download_count: Option<i64>,
    /// Download allowance.
    pub max_downloads: Option<i64>,
    /// Rejection reason.
    pub rejection_reason: Option<String>,
}

impl From<DownloadStatus> for DownloadStatusResponse {
    fn from(status: DownloadStatus) -> Self {
        Self {
            status: status
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "none".to_string()),
            download_token: status.download_token,
            download_count: status.download_count,
            max_downloads: status.max_downloads,
            rejection_reason: status.rejection_reason,
        }
    }
}

/// Admin view of a download request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRequestResponse {
    /// Request ID.
    pub id: Uuid,
    /// Target document.
    pub document_id: Uuid,
    /// Requesting user.
    pub requested_by: Uuid,
    /// Lifecycle status.
    pub status: RequestStatus,
    /// Requester's reason.
    pub request_reason: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Deciding admin, if decided.
    pub approved_by: Option<Uuid>,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
    /// Rejection reason.
    pub rejection_reason: Option<String>,
    /// Downloads consumed.
    pub download_count: i64,
    /// Download allowance.
    pub max_downloads: i64,
}

impl From<DownloadRequest> for DownloadRequestResponse {
    fn from(request: DownloadRequest) -> Self {
        Self {
            id: request.id,
            document_id: request.document_id,
            requested_by: request.requested_by,
            status: request.status,
            request_reason: request.request_reason,
            created_at: request.created_at,
            approved_by: request.approved_by,
            approved_at: request.approved_at,
            rejection_reason: request.rejection_reason,
            download_count: request.download_count,
            max_downloads: request.max_downloads,
        }
    }
}

/// Decision result: the new status plus the token when approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResponse {
    /// Request ID.
    pub request_id: Uuid,
    /// Post-decision status.
    pub status: RequestStatus,
    /// Token issued on approval, absent on rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_token: Option<String>,
}
