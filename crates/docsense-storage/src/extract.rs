//! Text extraction for search indexing.
//!
//! Only plain text is extracted; binary formats index with empty content.
//! Extraction failures degrade to empty content rather than failing the
//! upload.

use bytes::Bytes;

/// Extract searchable text from uploaded content based on its MIME type.
pub fn extract_text(mime_type: &str, data: &Bytes) -> String {
    match mime_type {
        "text/plain" => String::from_utf8_lossy(data).into_owned(),
        _ => String::new(),
    }
}
