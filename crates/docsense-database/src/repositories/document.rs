//! Document repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::types::Json;
use uuid::Uuid;

use docsense_core::error::{AppError, ErrorKind};
use docsense_core::result::AppResult;
use docsense_core::types::pagination::{PageRequest, PageResponse};
use docsense_entity::document::{CreateDocument, Document, DocumentStatus};

/// Filters for document listing.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    /// Case-insensitive substring match over title, content, and tags.
    pub search: Option<String>,
    /// Restrict to a file type (extension).
    pub file_type: Option<String>,
    /// Restrict to a processing status.
    pub status: Option<DocumentStatus>,
    /// Restrict visibility to documents owned by this user or public ones.
    /// `None` means unrestricted (admin).
    pub visible_to: Option<Uuid>,
    /// Sort column (allow-listed).
    pub sort_by: Option<String>,
    /// Sort descending when true.
    pub descending: bool,
}

/// Aggregate statistics over the visible document set.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DocumentStats {
    /// Number of visible documents.
    pub total_documents: u64,
    /// Combined size in bytes.
    pub total_size: u64,
}

/// A positional bind value for dynamically assembled document queries.
#[derive(Debug, Clone)]
enum Bind {
    Text(String),
    Id(Uuid),
}

/// Repository for document metadata.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
}

impl DocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a document by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find document", e))
    }

    /// Check whether a document exists.
    pub async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to check document", e)
            })?;
        Ok(count > 0)
    }

    /// Register an uploaded document.
    pub async fn create(&self, data: &CreateDocument) -> AppResult<Document> {
        let now = Utc::now();
        sqlx::query_as::<_, Document>(
            "INSERT INTO documents (id, title, original_name, filename, file_type, mime_type, \
             file_size, content, uploaded_by, status, is_public, tags, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.original_name)
        .bind(&data.filename)
        .bind(&data.file_type)
        .bind(&data.mime_type)
        .bind(data.file_size)
        .bind(&data.content)
        .bind(data.uploaded_by)
        .bind(data.status)
        .bind(data.is_public)
        .bind(Json(&data.tags))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create document", e))
    }

    /// List documents with search, filters, sorting, and pagination.
    pub async fn list(
        &self,
        filter: &DocumentFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Document>> {
        let (where_sql, binds) = Self::build_where(filter);

        let count_sql = format!("SELECT COUNT(*) FROM documents{where_sql}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for bind in &binds {
            count_query = match bind {
                Bind::Text(s) => count_query.bind(s.clone()),
                Bind::Id(id) => count_query.bind(*id),
            };
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count documents", e))?;

        let order = Self::order_clause(filter);
        let list_sql = format!("SELECT * FROM documents{where_sql} ORDER BY {order} LIMIT ? OFFSET ?");
        let mut list_query = sqlx::query_as::<_, Document>(&list_sql);
        for bind in &binds {
            list_query = match bind {
                Bind::Text(s) => list_query.bind(s.clone()),
                Bind::Id(id) => list_query.bind(*id),
            };
        }
        let documents = list_query
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list documents", e))?;

        Ok(PageResponse::new(
            documents,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Aggregate statistics over the set matched by the visibility filter.
    pub async fn stats(&self, visible_to: Option<Uuid>) -> AppResult<DocumentStats> {
        let row: (i64, i64) = if let Some(user_id) = visible_to {
            sqlx::query_as(
                "SELECT COUNT(*), COALESCE(SUM(file_size), 0) FROM documents \
                 WHERE uploaded_by = ? OR is_public = TRUE",
            )
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
        } else {
            sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(file_size), 0) FROM documents")
                .fetch_one(&self.pool)
                .await
        }
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to compute document stats", e)
        })?;

        Ok(DocumentStats {
            total_documents: row.0 as u64,
            total_size: row.1 as u64,
        })
    }

    /// Stamp the last-accessed time.
    pub async fn touch_last_accessed(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE documents SET last_accessed = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to touch document", e)
            })?;
        Ok(())
    }

    /// Delete a document; related download requests cascade.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete document", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Build the WHERE clause and its positional binds for a filter.
    ///
    /// All values are passed as binds; only allow-listed column names are
    /// interpolated.
    fn build_where(filter: &DocumentFilter) -> (String, Vec<Bind>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut binds: Vec<Bind> = Vec::new();

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.to_lowercase());
            clauses.push(
                "(LOWER(title) LIKE ? OR LOWER(content) LIKE ? OR LOWER(tags) LIKE ?)".to_string(),
            );
            binds.push(Bind::Text(pattern.clone()));
            binds.push(Bind::Text(pattern.clone()));
            binds.push(Bind::Text(pattern));
        }
        if let Some(file_type) = filter.file_type.as_deref().filter(|t| !t.is_empty()) {
            clauses.push("file_type = ?".to_string());
            binds.push(Bind::Text(file_type.to_lowercase()));
        }
        if let Some(status) = filter.status {
            clauses.push("status = ?".to_string());
            binds.push(Bind::Text(status.as_str().to_string()));
        }
        if let Some(user_id) = filter.visible_to {
            clauses.push("(uploaded_by = ? OR is_public = TRUE)".to_string());
            binds.push(Bind::Id(user_id));
        }

        if clauses.is_empty() {
            (String::new(), binds)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), binds)
        }
    }

    /// Resolve the ORDER BY clause from an allow-list of sortable columns.
    fn order_clause(filter: &DocumentFilter) -> String {
        let column = match filter.sort_by.as_deref() {
            Some("title") => "title",
            Some("file_size") => "file_size",
            Some("download_count") => "download_count",
            _ => "created_at",
        };
        let direction = if filter.descending { "DESC" } else { "ASC" };
        format!("{column} {direction}")
    }
}
