//! File storage configuration.

use serde::{Deserialize, Serialize};

/// File storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for application data (uploads, database).
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            max_upload_size_bytes: default_max_upload(),
        }
    }
}

fn default_data_root() -> String {
    "data".to_string()
}

fn default_max_upload() -> u64 {
    50 * 1024 * 1024
}
