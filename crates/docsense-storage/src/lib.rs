//! Content storage for DocSense.
//!
//! The [`ContentStore`] trait is the seam the services program against;
//! [`LocalStore`] is the filesystem implementation used in production and
//! tests alike.

pub mod extract;
pub mod local;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use docsense_core::result::AppResult;

/// A stream of file content chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send + 'static>>;

/// Abstract byte store addressed by opaque storage keys.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Provider name for logging.
    fn provider_type(&self) -> &str;

    /// Persist a blob under the given key.
    async fn write(&self, key: &str, data: Bytes) -> AppResult<()>;

    /// Read an entire blob into memory.
    async fn read_bytes(&self, key: &str) -> AppResult<Bytes>;

    /// Open a blob as a chunked stream.
    async fn read_stream(&self, key: &str) -> AppResult<ByteStream>;

    /// Whether a blob exists.
    async fn exists(&self, key: &str) -> bool;

    /// Remove a blob. Missing blobs are not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;
}

impl std::fmt::Debug for dyn ContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStore")
            .field("provider", &self.provider_type())
            .finish()
    }
}

pub use local::LocalStore;
