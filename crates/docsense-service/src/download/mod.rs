//! The download-request authorization workflow.
//!
//! [`service::DownloadRequestService`] is the transition engine over the
//! persisted ledger; [`token::TokenIssuer`] mints the unguessable download
//! tokens bound to approved requests.

pub mod service;
pub mod token;

pub use service::{Decision, DownloadGrant, DownloadRequestService, DownloadStatus};
pub use token::TokenIssuer;
