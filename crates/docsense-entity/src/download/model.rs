//! Download request entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::RequestStatus;

/// A user's request to download a protected document.
///
/// Created `Pending` with a 7-day request TTL recorded; an admin decision
/// moves it exactly once to `Approved` (issuing a 24-hour download token)
/// or `Rejected`. Count exhaustion flips an approved request to `Expired`;
/// wall-clock token expiry leaves the stored status untouched and is
/// enforced by [`DownloadRequest::is_valid`] instead.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DownloadRequest {
    /// Unique request identifier.
    pub id: Uuid,
    /// Document this request targets.
    pub document_id: Uuid,
    /// User who made the request.
    pub requested_by: Uuid,
    /// Lifecycle status.
    pub status: RequestStatus,
    /// Reason given by the requester (non-empty).
    pub request_reason: String,
    /// Admin who decided the request.
    pub approved_by: Option<Uuid>,
    /// When the request was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// When the request was rejected.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Reason the admin gave for rejecting.
    pub rejection_reason: Option<String>,
    /// Single-use download token, present iff the request is or was approved.
    pub download_token: Option<String>,
    /// Pending-request TTL recorded at creation (now + 7 days).
    pub request_expires_at: Option<DateTime<Utc>>,
    /// Token TTL set at approval (now + 24 hours).
    pub token_expires_at: Option<DateTime<Utc>>,
    /// When the token was last successfully consumed.
    pub downloaded_at: Option<DateTime<Utc>>,
    /// Number of successful downloads so far.
    pub download_count: i64,
    /// Maximum downloads permitted, fixed at approval time.
    pub max_downloads: i64,
    /// Requester IP address (audit).
    pub ip_address: String,
    /// Requester User-Agent (audit).
    pub user_agent: String,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the request was last updated.
    pub updated_at: DateTime<Utc>,
}

impl DownloadRequest {
    /// Pure validity predicate for token consumption.
    ///
    /// A token is consumable iff the request is approved, the token TTL has
    /// not passed, and the download allowance is not exhausted. This never
    /// mutates stored state: a time-expired request keeps reading
    /// `approved` from status queries while failing consumption.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        if self.status != RequestStatus::Approved {
            return false;
        }
        if let Some(expires_at) = self.token_expires_at {
            if now > expires_at {
                return false;
            }
        }
        self.download_count < self.max_downloads
    }

    /// Whether the request still counts against the one-active-request
    /// invariant.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Data required to create a new download request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDownloadRequest {
    /// Target document.
    pub document_id: Uuid,
    /// Requesting user.
    pub requested_by: Uuid,
    /// Trimmed, non-empty reason.
    pub request_reason: String,
    /// Requester IP (audit).
    pub ip_address: String,
    /// Requester User-Agent (audit).
    pub user_agent: String,
    /// Pending-request TTL (now + 7 days).
    pub request_expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(status: RequestStatus) -> DownloadRequest {
        let now = Utc::now();
        DownloadRequest {
            id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            requested_by: Uuid::new_v4(),
            status,
            request_reason: "audit".into(),
            approved_by: None,
            approved_at: None,
            rejected_at: None,
            rejection_reason: None,
            download_token: None,
            request_expires_at: Some(now + Duration::days(7)),
            token_expires_at: None,
            downloaded_at: None,
            download_count: 0,
            max_downloads: 1,
            ip_address: "127.0.0.1".into(),
            user_agent: "test".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn pending_requests_never_validate() {
        let now = Utc::now();
        assert!(!request(RequestStatus::Pending).is_valid(now));
        assert!(!request(RequestStatus::Rejected).is_valid(now));
        assert!(!request(RequestStatus::Expired).is_valid(now));
    }

    #[test]
    fn approved_within_window_validates() {
        let now = Utc::now();
        let mut req = request(RequestStatus::Approved);
        req.token_expires_at = Some(now + Duration::hours(24));
        assert!(req.is_valid(now));
    }

    #[test]
    fn time_expiry_invalidates_without_status_change() {
        let now = Utc::now();
        let mut req = request(RequestStatus::Approved);
        req.token_expires_at = Some(now - Duration::seconds(1));
        assert!(!req.is_valid(now));
        // The stored status still reads approved.
        assert_eq!(req.status, RequestStatus::Approved);
    }

    #[test]
    fn count_exhaustion_invalidates() {
        let now = Utc::now();
        let mut req = request(RequestStatus::Approved);
        req.token_expires_at = Some(now + Duration::hours(1));
        req.max_downloads = 2;
        req.download_count = 2;
        assert!(!req.is_valid(now));
    }

    #[test]
    fn missing_token_expiry_means_no_time_limit() {
        let now = Utc::now();
        let req = request(RequestStatus::Approved);
        assert!(req.is_valid(now));
    }
}
