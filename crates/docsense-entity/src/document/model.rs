//! Document entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::status::DocumentStatus;

/// An uploaded document and its metadata.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Unique document identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Original filename as uploaded.
    pub original_name: String,
    /// Unique storage key under the content store root.
    pub filename: String,
    /// Lowercase file extension (pdf, docx, txt, ...).
    pub file_type: String,
    /// MIME type as uploaded.
    pub mime_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Extracted text content used for search indexing (may be empty).
    #[serde(skip_serializing)]
    pub content: String,
    /// User who uploaded the document.
    pub uploaded_by: Uuid,
    /// Processing status.
    pub status: DocumentStatus,
    /// Whether the document is visible to every user.
    pub is_public: bool,
    /// Security policy flag: whether downloads bypass the request workflow.
    pub allow_download: bool,
    /// Aggregate count of successful token downloads.
    pub download_count: i64,
    /// Last time the document was viewed or fetched.
    pub last_accessed: Option<DateTime<Utc>>,
    /// Free-form tags used for search.
    pub tags: Json<Vec<String>>,
    /// When the document was uploaded.
    pub created_at: DateTime<Utc>,
    /// When the document was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Human-readable file size, e.g. "2.50 MB".
    pub fn formatted_size(&self) -> String {
        const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
        let bytes = self.file_size.max(0) as f64;
        if bytes == 0.0 {
            return "0 Bytes".to_string();
        }
        let i = (bytes.log2() / 10.0).floor().min((UNITS.len() - 1) as f64) as usize;
        format!("{:.2} {}", bytes / 1024f64.powi(i as i32), UNITS[i])
    }
}

/// Data required to register an uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    /// Display title.
    pub title: String,
    /// Original filename.
    pub original_name: String,
    /// Storage key.
    pub filename: String,
    /// Lowercase file extension.
    pub file_type: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Extracted text content.
    pub content: String,
    /// Uploading user.
    pub uploaded_by: Uuid,
    /// Initial status.
    pub status: DocumentStatus,
    /// Public visibility flag.
    pub is_public: bool,
    /// Tags.
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(size: i64) -> Document {
        Document {
            id: Uuid::new_v4(),
            title: "t".into(),
            original_name: "t.txt".into(),
            filename: "abc-t.txt".into(),
            file_type: "txt".into(),
            mime_type: "text/plain".into(),
            file_size: size,
            content: String::new(),
            uploaded_by: Uuid::new_v4(),
            status: DocumentStatus::Processed,
            is_public: false,
            allow_download: false,
            download_count: 0,
            last_accessed: None,
            tags: Json(vec![]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn formatted_size_scales_units() {
        assert_eq!(doc(0).formatted_size(), "0 Bytes");
        assert_eq!(doc(512).formatted_size(), "512.00 Bytes");
        assert_eq!(doc(2_621_440).formatted_size(), "2.50 MB");
    }
}
