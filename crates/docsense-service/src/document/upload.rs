//! Document upload: mime allow-list, storage key generation, text
//! extraction, and metadata registration.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use docsense_core::error::AppError;
use docsense_database::repositories::document::DocumentRepository;
use docsense_entity::document::{CreateDocument, Document, DocumentStatus};
use docsense_storage::{ContentStore, extract};

use crate::context::RequestContext;

/// MIME types accepted for upload.
const ALLOWED_MIME_TYPES: [&str; 10] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "image/jpeg",
    "image/png",
];

/// Input for a document upload.
#[derive(Debug, Clone)]
pub struct UploadInput {
    /// Original filename as sent by the client.
    pub original_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// File content.
    pub data: Bytes,
    /// Optional display title; defaults to the original filename.
    pub title: Option<String>,
    /// Comma-separated tags.
    pub tags: Option<String>,
    /// Whether the document should be publicly visible.
    pub is_public: bool,
}

/// Handles document uploads.
#[derive(Clone)]
pub struct UploadService {
    doc_repo: Arc<DocumentRepository>,
    store: Arc<dyn ContentStore>,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService").finish()
    }
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(doc_repo: Arc<DocumentRepository>, store: Arc<dyn ContentStore>) -> Self {
        Self { doc_repo, store }
    }

    /// Store uploaded content and register its metadata.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        input: UploadInput,
    ) -> Result<Document, AppError> {
        if input.data.is_empty() {
            return Err(AppError::validation("No file uploaded"));
        }
        if !ALLOWED_MIME_TYPES.contains(&input.mime_type.as_str()) {
            return Err(AppError::validation(
                "Invalid file type. Only PDF, DOC, DOCX, XLS, XLSX, PPT, PPTX, TXT, JPG, PNG files are allowed.",
            ));
        }

        let original_name = sanitize_filename(&input.original_name);
        if original_name.is_empty() {
            return Err(AppError::validation("Invalid filename"));
        }

        let file_type = original_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        let filename = format!("{}-{}", Uuid::new_v4(), original_name);
        let content = extract::extract_text(&input.mime_type, &input.data);

        self.store.write(&filename, input.data.clone()).await?;

        let title = input
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(&original_name)
            .to_string();

        let tags = input
            .tags
            .as_deref()
            .map(|t| {
                t.split(',')
                    .map(|tag| tag.trim().to_string())
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let document = self
            .doc_repo
            .create(&CreateDocument {
                title,
                original_name,
                filename,
                file_type,
                mime_type: input.mime_type,
                file_size: input.data.len() as i64,
                content,
                uploaded_by: ctx.user_id,
                status: DocumentStatus::Processed,
                is_public: input.is_public,
                tags,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            document_id = %document.id,
            file_type = %document.file_type,
            size = document.file_size,
            "Document uploaded"
        );
        Ok(document)
    }
}

/// Strip path components and control characters from a client filename.
fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    base.chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .replace("..", "_")
}
