//! Download request entity — the ledger rows of the download authorization
//! workflow.

pub mod model;
pub mod status;

pub use model::{CreateDownloadRequest, DownloadRequest};
pub use status::RequestStatus;
