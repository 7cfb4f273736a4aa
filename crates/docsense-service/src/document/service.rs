//! Document listing, viewing, and deletion with access control.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use docsense_auth::access;
use docsense_core::error::AppError;
use docsense_core::types::pagination::{PageRequest, PageResponse};
use docsense_database::repositories::document::{
    DocumentFilter, DocumentRepository, DocumentStats,
};
use docsense_entity::document::{Document, DocumentStatus};
use docsense_storage::{ByteStream, ContentStore};

use crate::context::RequestContext;

/// Query parameters for document listing.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    /// Substring search over title, content, and tags.
    pub search: Option<String>,
    /// File type filter (extension).
    pub file_type: Option<String>,
    /// Processing status filter.
    pub status: Option<DocumentStatus>,
    /// Sort column.
    pub sort_by: Option<String>,
    /// Sort descending when true (the default).
    pub descending: bool,
}

/// Document metadata and content operations.
#[derive(Clone)]
pub struct DocumentService {
    doc_repo: Arc<DocumentRepository>,
    store: Arc<dyn ContentStore>,
}

impl std::fmt::Debug for DocumentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentService").finish()
    }
}

impl DocumentService {
    /// Creates a new document service.
    pub fn new(doc_repo: Arc<DocumentRepository>, store: Arc<dyn ContentStore>) -> Self {
        Self { doc_repo, store }
    }

    /// List documents visible to the caller, with search and filters.
    ///
    /// Non-admin callers only see their own documents and public ones.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: DocumentQuery,
        page: PageRequest,
    ) -> Result<(PageResponse<Document>, DocumentStats), AppError> {
        let visible_to = if ctx.is_admin() {
            None
        } else {
            Some(ctx.user_id)
        };

        let filter = DocumentFilter {
            search: query.search,
            file_type: query.file_type,
            status: query.status,
            visible_to,
            sort_by: query.sort_by,
            descending: query.descending,
        };

        let documents = self.doc_repo.list(&filter, &page).await?;
        let stats = self.doc_repo.stats(visible_to).await?;
        Ok((documents, stats))
    }

    /// Fetch a single document's metadata, enforcing the view predicate.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Document, AppError> {
        let document = self.require_document(id).await?;

        if !access::can_view(&document, ctx.user_id, &ctx.role) {
            return Err(AppError::forbidden("Access denied"));
        }

        self.doc_repo.touch_last_accessed(id).await?;
        Ok(document)
    }

    /// Stream a document's bytes for inline viewing.
    pub async fn view(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<(Document, ByteStream), AppError> {
        let document = self.require_document(id).await?;

        if !access::can_view(&document, ctx.user_id, &ctx.role) {
            return Err(AppError::forbidden("Access denied"));
        }

        if !self.store.exists(&document.filename).await {
            return Err(AppError::not_found("File not found on server"));
        }

        self.doc_repo.touch_last_accessed(id).await?;
        let stream = self.store.read_stream(&document.filename).await?;
        Ok((document, stream))
    }

    /// Stream a document's bytes for an already-authorized download.
    ///
    /// Authorization is the caller's responsibility (token consumption
    /// happens in the download service); this only resolves bytes.
    pub async fn open_content(&self, document: &Document) -> Result<ByteStream, AppError> {
        if !self.store.exists(&document.filename).await {
            return Err(AppError::not_found("File not found on server"));
        }
        self.store.read_stream(&document.filename).await
    }

    /// Delete a document, its stored bytes, and (by cascade) its download
    /// requests.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        let document = self.require_document(id).await?;

        if !access::can_delete_document(&document, ctx.user_id, &ctx.role) {
            return Err(AppError::forbidden("Access denied"));
        }

        self.store.delete(&document.filename).await?;
        self.doc_repo.delete(id).await?;

        info!(user_id = %ctx.user_id, document_id = %id, "Document deleted");
        Ok(())
    }

    async fn require_document(&self, id: Uuid) -> Result<Document, AppError> {
        self.doc_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))
    }
}
