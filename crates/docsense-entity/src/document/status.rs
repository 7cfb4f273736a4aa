//! Document processing status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing status of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Upload accepted, content extraction in progress.
    Processing,
    /// Ready for viewing and download requests.
    Processed,
    /// Content extraction failed.
    Failed,
    /// Archived by an admin.
    Archived,
}

impl DocumentStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Processed => "processed",
            Self::Failed => "failed",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
