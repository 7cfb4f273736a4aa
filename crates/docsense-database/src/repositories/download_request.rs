//! Download request repository — the persisted ledger.
//!
//! Every lifecycle transition is a single conditional statement so that
//! precondition checks are atomic with their mutations: racing writers get
//! zero affected rows instead of a lost update.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use docsense_core::error::{AppError, ErrorKind};
use docsense_core::result::AppResult;
use docsense_core::types::pagination::{PageRequest, PageResponse};
use docsense_entity::download::{CreateDownloadRequest, DownloadRequest, RequestStatus};

/// Repository for download request persistence and transitions.
#[derive(Debug, Clone)]
pub struct DownloadRequestRepository {
    pool: SqlitePool,
}

impl DownloadRequestRepository {
    /// Create a new download request repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new pending request.
    ///
    /// The partial unique index over active `(document_id, requested_by)`
    /// pairs rejects a second active request atomically; the violation is
    /// surfaced as `Conflict`.
    pub async fn create(&self, data: &CreateDownloadRequest) -> AppResult<DownloadRequest> {
        let now = Utc::now();
        sqlx::query_as::<_, DownloadRequest>(
            "INSERT INTO download_requests (id, document_id, requested_by, status, request_reason, \
             request_expires_at, ip_address, user_agent, created_at, updated_at) \
             VALUES (?, ?, ?, 'pending', ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.document_id)
        .bind(data.requested_by)
        .bind(&data.request_reason)
        .bind(data.request_expires_at)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::conflict(
                "You already have a pending or approved download request for this document",
            ),
            _ => AppError::with_source(ErrorKind::Database, "Failed to create download request", e),
        })
    }

    /// Find a request by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DownloadRequest>> {
        sqlx::query_as::<_, DownloadRequest>("SELECT * FROM download_requests WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find download request", e)
            })
    }

    /// Most recently created request for a `(document, user)` pair.
    pub async fn find_latest(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<DownloadRequest>> {
        sqlx::query_as::<_, DownloadRequest>(
            "SELECT * FROM download_requests WHERE document_id = ? AND requested_by = ? \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(document_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find latest request", e)
        })
    }

    /// Find a request by its download token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<DownloadRequest>> {
        sqlx::query_as::<_, DownloadRequest>(
            "SELECT * FROM download_requests WHERE download_token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find request by token", e)
        })
    }

    /// Check whether a token value is already in use.
    pub async fn token_exists(&self, token: &str) -> AppResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM download_requests WHERE download_token = ?")
                .bind(token)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to check token", e)
                })?;
        Ok(count > 0)
    }

    /// Approve a pending request, issuing its token and fixing the
    /// download allowance.
    ///
    /// Returns `None` when the request was not in `pending` (the caller
    /// distinguishes "already processed" from "not found").
    pub async fn approve(
        &self,
        id: Uuid,
        admin_id: Uuid,
        token: &str,
        max_downloads: i64,
        token_expires_at: DateTime<Utc>,
    ) -> AppResult<Option<DownloadRequest>> {
        let now = Utc::now();
        sqlx::query_as::<_, DownloadRequest>(
            "UPDATE download_requests SET \
                 status = 'approved', \
                 approved_by = ?, \
                 approved_at = ?, \
                 max_downloads = ?, \
                 download_token = ?, \
                 token_expires_at = ?, \
                 updated_at = ? \
             WHERE id = ? AND status = 'pending' RETURNING *",
        )
        .bind(admin_id)
        .bind(now)
        .bind(max_downloads)
        .bind(token)
        .bind(token_expires_at)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::conflict("Download token collision")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to approve request", e),
        })
    }

    /// Reject a pending request.
    ///
    /// Returns `None` when the request was not in `pending`.
    pub async fn reject(
        &self,
        id: Uuid,
        rejection_reason: &str,
    ) -> AppResult<Option<DownloadRequest>> {
        let now = Utc::now();
        sqlx::query_as::<_, DownloadRequest>(
            "UPDATE download_requests SET \
                 status = 'rejected', \
                 rejected_at = ?, \
                 rejection_reason = ?, \
                 updated_at = ? \
             WHERE id = ? AND status = 'pending' RETURNING *",
        )
        .bind(now)
        .bind(rejection_reason)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reject request", e))
    }

    /// Consume one download allowance for a token.
    ///
    /// The guarded update increments the counter, flips the status to
    /// `expired` when the allowance is exhausted by this consumption, and
    /// refuses expired or over-consumed tokens — all in one statement, so
    /// two racing downloads of a one-shot token cannot both succeed. The
    /// document aggregate counter is bumped in the same transaction.
    ///
    /// Returns `None` when the guard matched no row; the caller re-reads
    /// the request to classify the failure.
    pub async fn consume(&self, token: &str) -> AppResult<Option<DownloadRequest>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let request = sqlx::query_as::<_, DownloadRequest>(
            "UPDATE download_requests SET \
                 download_count = download_count + 1, \
                 downloaded_at = ?, \
                 updated_at = ?, \
                 status = CASE WHEN download_count + 1 >= max_downloads \
                               THEN 'expired' ELSE status END \
             WHERE download_token = ? \
               AND status = 'approved' \
               AND download_count < max_downloads \
               AND (token_expires_at IS NULL OR token_expires_at >= ?) \
             RETURNING *",
        )
        .bind(now)
        .bind(now)
        .bind(token)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to consume token", e))?;

        if let Some(ref request) = request {
            sqlx::query(
                "UPDATE documents SET download_count = download_count + 1, \
                 last_accessed = ?, updated_at = ? WHERE id = ?",
            )
            .bind(now)
            .bind(now)
            .bind(request.document_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to bump document counter", e)
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit consumption", e)
        })?;

        Ok(request)
    }

    /// List requests for the admin dashboard, newest first.
    pub async fn find_all(
        &self,
        status: Option<RequestStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DownloadRequest>> {
        let (total, requests) = if let Some(status) = status {
            let total: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM download_requests WHERE status = ?")
                    .bind(status)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Database, "Failed to count requests", e)
                    })?;
            let requests = sqlx::query_as::<_, DownloadRequest>(
                "SELECT * FROM download_requests WHERE status = ? \
                 ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(status)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list requests", e)
            })?;
            (total, requests)
        } else {
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM download_requests")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count requests", e)
                })?;
            let requests = sqlx::query_as::<_, DownloadRequest>(
                "SELECT * FROM download_requests ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list requests", e)
            })?;
            (total, requests)
        };

        Ok(PageResponse::new(
            requests,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}
