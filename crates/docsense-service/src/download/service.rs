//! The download request ledger: creation, status queries, admin
//! decisions, and token-gated consumption.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use docsense_auth::access;
use docsense_core::error::AppError;
use docsense_core::types::pagination::{PageRequest, PageResponse};
use docsense_database::repositories::document::DocumentRepository;
use docsense_database::repositories::download_request::DownloadRequestRepository;
use docsense_entity::document::Document;
use docsense_entity::download::{CreateDownloadRequest, DownloadRequest, RequestStatus};

use super::token::TokenIssuer;
use crate::context::RequestContext;

/// TTL recorded on a freshly created (pending) request.
const REQUEST_TTL_DAYS: i64 = 7;

/// TTL of the download token issued at approval.
const TOKEN_TTL_HOURS: i64 = 24;

/// Fallback reason stored when an admin rejects without giving one.
const DEFAULT_REJECTION_REASON: &str = "No reason provided";

/// An admin's decision on a pending request.
#[derive(Debug, Clone)]
pub enum Decision {
    /// Approve, optionally overriding the download allowance (min 1).
    Approve {
        /// Requested maximum downloads; defaults to 1.
        max_downloads: Option<i64>,
    },
    /// Reject with an optional reason.
    Reject {
        /// Reason shown to the requester.
        reason: Option<String>,
    },
}

/// Snapshot returned by the status query.
///
/// `status: None` means no request row exists for the pair — a state
/// distinct from every stored status ("none" on the wire).
#[derive(Debug, Clone, serde::Serialize)]
pub struct DownloadStatus {
    /// Stored status of the most recent request, if any.
    pub status: Option<RequestStatus>,
    /// Issued token, when the request is or was approved.
    pub download_token: Option<String>,
    /// Downloads consumed so far.
    pub download_count: Option<i64>,
    /// Download allowance.
    pub max_downloads: Option<i64>,
    /// Rejection reason, when rejected.
    pub rejection_reason: Option<String>,
}

/// A successfully consumed download: the (updated) request and the
/// document whose bytes the caller may now stream.
#[derive(Debug, Clone)]
pub struct DownloadGrant {
    /// Ledger entry after consumption.
    pub request: DownloadRequest,
    /// The document to stream.
    pub document: Document,
}

/// The transition engine for download requests.
#[derive(Debug, Clone)]
pub struct DownloadRequestService {
    request_repo: Arc<DownloadRequestRepository>,
    doc_repo: Arc<DocumentRepository>,
    issuer: TokenIssuer,
}

impl DownloadRequestService {
    /// Creates a new download request service.
    pub fn new(
        request_repo: Arc<DownloadRequestRepository>,
        doc_repo: Arc<DocumentRepository>,
        issuer: TokenIssuer,
    ) -> Self {
        Self {
            request_repo,
            doc_repo,
            issuer,
        }
    }

    /// File a new download request for a document.
    ///
    /// At most one active (pending or approved) request may exist per
    /// `(document, requester)` pair; a second is rejected with `Conflict`
    /// by the store's unique index, so racing duplicates cannot both land.
    pub async fn create_request(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        reason: &str,
    ) -> Result<DownloadRequest, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::validation("Download reason is required"));
        }

        if !self.doc_repo.exists(document_id).await? {
            return Err(AppError::not_found("Document not found"));
        }

        let request = self
            .request_repo
            .create(&CreateDownloadRequest {
                document_id,
                requested_by: ctx.user_id,
                request_reason: reason.to_string(),
                ip_address: ctx.ip_address.clone(),
                user_agent: ctx.user_agent.clone().unwrap_or_else(|| "Unknown".into()),
                request_expires_at: Utc::now() + Duration::days(REQUEST_TTL_DAYS),
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            document_id = %document_id,
            request_id = %request.id,
            "Download request created"
        );
        Ok(request)
    }

    /// Status of the caller's most recent request for a document.
    ///
    /// Reports the stored status as-is: a time-expired approved request
    /// still reads `approved` here even though consumption would fail.
    pub async fn status_for(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> Result<DownloadStatus, AppError> {
        let latest = self
            .request_repo
            .find_latest(document_id, ctx.user_id)
            .await?;

        Ok(match latest {
            None => DownloadStatus {
                status: None,
                download_token: None,
                download_count: None,
                max_downloads: None,
                rejection_reason: None,
            },
            Some(request) => DownloadStatus {
                status: Some(request.status),
                download_token: request.download_token,
                download_count: Some(request.download_count),
                max_downloads: Some(request.max_downloads),
                rejection_reason: request.rejection_reason,
            },
        })
    }

    /// List requests for the admin dashboard.
    pub async fn list_requests(
        &self,
        ctx: &RequestContext,
        status: Option<RequestStatus>,
        page: PageRequest,
    ) -> Result<PageResponse<DownloadRequest>, AppError> {
        access::require_admin(&ctx.role)?;
        self.request_repo.find_all(status, &page).await
    }

    /// Decide a pending request: exactly-once approve or reject.
    ///
    /// The precondition (`status == pending`) and the mutation are one
    /// conditional update; when two admins race, the loser observes
    /// `InvalidState`.
    pub async fn decide(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
        decision: Decision,
    ) -> Result<DownloadRequest, AppError> {
        access::require_admin(&ctx.role)?;

        let updated = match decision {
            Decision::Approve { max_downloads } => {
                let max_downloads = max_downloads.unwrap_or(1).max(1);
                let token = self.issuer.generate_unique().await?;
                let token_expires_at = Utc::now() + Duration::hours(TOKEN_TTL_HOURS);
                self.request_repo
                    .approve(request_id, ctx.user_id, &token, max_downloads, token_expires_at)
                    .await?
            }
            Decision::Reject { reason } => {
                let reason = reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .unwrap_or(DEFAULT_REJECTION_REASON);
                self.request_repo.reject(request_id, reason).await?
            }
        };

        match updated {
            Some(request) => {
                info!(
                    admin_id = %ctx.user_id,
                    request_id = %request.id,
                    status = %request.status,
                    "Download request decided"
                );
                Ok(request)
            }
            // Zero rows: distinguish a missing request from one already
            // decided by a (possibly racing) admin.
            None => match self.request_repo.find_by_id(request_id).await? {
                None => Err(AppError::not_found("Download request not found")),
                Some(_) => Err(AppError::invalid_state(
                    "Request has already been processed",
                )),
            },
        }
    }

    /// Validate a download token and consume one unit of its allowance.
    ///
    /// Consumption is a single guarded update: under concurrency a token
    /// with `max_downloads = N` yields exactly `N` successes. Failures are
    /// classified distinctly so the client can explain why: `NotFound`
    /// for unknown tokens, `Expired` for wall-clock expiry, and
    /// `LimitExceeded` for an exhausted allowance.
    pub async fn download_by_token(&self, token: &str) -> Result<DownloadGrant, AppError> {
        if token.is_empty() {
            return Err(AppError::validation("Download token required"));
        }

        if let Some(request) = self.request_repo.consume(token).await? {
            let document = self
                .doc_repo
                .find_by_id(request.document_id)
                .await?
                .ok_or_else(|| AppError::not_found("Document not found"))?;

            info!(
                request_id = %request.id,
                document_id = %document.id,
                download_count = request.download_count,
                max_downloads = request.max_downloads,
                "Download token consumed"
            );
            return Ok(DownloadGrant { request, document });
        }

        // The guard matched no row; re-read to say why.
        let request = self
            .request_repo
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("Invalid download token"))?;

        match request.status {
            RequestStatus::Expired => {
                Err(AppError::limit_exceeded("Download limit exceeded"))
            }
            RequestStatus::Approved => {
                let now = Utc::now();
                if request
                    .token_expires_at
                    .is_some_and(|expires_at| now > expires_at)
                {
                    Err(AppError::expired("Download token has expired"))
                } else if request.download_count >= request.max_downloads {
                    Err(AppError::limit_exceeded("Download limit exceeded"))
                } else {
                    // The request reads valid on re-read, so another
                    // consumer committed between our update and this read.
                    Err(AppError::limit_exceeded("Download limit exceeded"))
                }
            }
            RequestStatus::Pending | RequestStatus::Rejected => {
                Err(AppError::not_found("Invalid download token"))
            }
        }
    }
}
