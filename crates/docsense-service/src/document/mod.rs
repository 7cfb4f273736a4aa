//! Document services.

pub mod service;
pub mod upload;

pub use service::{DocumentQuery, DocumentService};
pub use upload::{UploadInput, UploadService};
