//! Download token generation.

use std::sync::Arc;

use rand::Rng;

use docsense_core::error::AppError;
use docsense_database::repositories::download_request::DownloadRequestRepository;

/// Number of random bytes per token (256 bits of entropy, hex-encoded).
const TOKEN_BYTES: usize = 32;

/// Bounded retries for the astronomically unlikely collision case. The
/// store's unique index remains the authority.
const MAX_ATTEMPTS: usize = 4;

/// Mints unguessable download tokens.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    request_repo: Arc<DownloadRequestRepository>,
}

impl TokenIssuer {
    /// Creates a new token issuer.
    pub fn new(request_repo: Arc<DownloadRequestRepository>) -> Self {
        Self { request_repo }
    }

    /// Generate a fresh token from the OS CSPRNG, checked against
    /// existing tokens before acceptance.
    pub async fn generate_unique(&self) -> Result<String, AppError> {
        for _ in 0..MAX_ATTEMPTS {
            let token = Self::random_token();
            if !self.request_repo.token_exists(&token).await? {
                return Ok(token);
            }
        }
        Err(AppError::internal(
            "Failed to generate a unique download token",
        ))
    }

    fn random_token() -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}
