//! Request context carrying the authenticated caller and audit metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docsense_entity::role::SUPERUSER;

/// Context for the current authenticated request.
///
/// Extracted from the access token by the API layer and passed into
/// service methods so that every operation knows *who* is acting and from
/// *where*.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The user's role name at the time the token was issued.
    pub role: String,
    /// The username (convenience field from the claims).
    pub username: String,
    /// IP address of the request origin.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        user_id: Uuid,
        role: String,
        username: String,
        ip_address: String,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            user_id,
            role,
            username,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user holds the administrative role.
    pub fn is_admin(&self) -> bool {
        self.role == SUPERUSER
    }
}
