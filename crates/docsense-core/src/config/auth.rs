//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Username for the bootstrap superuser account.
    #[serde(default = "default_bootstrap_username")]
    pub bootstrap_username: String,
    /// Email for the bootstrap superuser account.
    #[serde(default = "default_bootstrap_email")]
    pub bootstrap_email: String,
    /// Password for the bootstrap superuser account.
    #[serde(default = "default_bootstrap_password")]
    pub bootstrap_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            password_min_length: default_password_min(),
            bootstrap_username: default_bootstrap_username(),
            bootstrap_email: default_bootstrap_email(),
            bootstrap_password: default_bootstrap_password(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    7
}

fn default_password_min() -> usize {
    6
}

fn default_bootstrap_username() -> String {
    "admin".to_string()
}

fn default_bootstrap_email() -> String {
    "admin@docsense.local".to_string()
}

fn default_bootstrap_password() -> String {
    "admin123".to_string()
}
