//! Local filesystem content store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use docsense_core::error::{AppError, ErrorKind};
use docsense_core::result::AppResult;

use super::{ByteStream, ContentStore};

/// Local filesystem store rooted at a configured directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    /// Root directory for all stored files.
    root: PathBuf,
}

impl LocalStore {
    /// Create a new local store rooted at the given path.
    pub async fn new(root_path: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root_path.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a storage key to an absolute path within the root.
    ///
    /// Keys are flat names generated by the upload service; path
    /// separators are rejected so a key can never escape the root.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(AppError::storage(format!("Invalid storage key: {key}")));
        }
        Ok(self.root.join(key))
    }

    fn open_error(key: &str, e: std::io::Error) -> AppError {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::not_found(format!("File not found: {key}"))
        } else {
            AppError::with_source(ErrorKind::Storage, format!("Failed to open file: {key}"), e)
        }
    }
}

#[async_trait]
impl ContentStore for LocalStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn write(&self, key: &str, data: Bytes) -> AppResult<()> {
        let path = self.resolve(key)?;
        fs::write(&path, &data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to write file: {key}"), e)
        })?;
        debug!(key, bytes = data.len(), "Wrote file");
        Ok(())
    }

    async fn read_bytes(&self, key: &str) -> AppResult<Bytes> {
        let path = self.resolve(key)?;
        let data = fs::read(&path)
            .await
            .map_err(|e| Self::open_error(key, e))?;
        Ok(Bytes::from(data))
    }

    async fn read_stream(&self, key: &str) -> AppResult<ByteStream> {
        let path = self.resolve(key)?;
        let file = fs::File::open(&path)
            .await
            .map_err(|e| Self::open_error(key, e))?;
        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream.map(|r| r.map(Bytes::from))))
    }

    async fn exists(&self, key: &str) -> bool {
        match self.resolve(key) {
            Ok(path) => Path::new(&path).exists(),
            Err(_) => false,
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete file: {key}"),
                e,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_read_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();

        store
            .write("abc-test.txt", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        assert!(store.exists("abc-test.txt").await);
        assert_eq!(
            store.read_bytes("abc-test.txt").await.unwrap(),
            Bytes::from_static(b"hello")
        );

        store.delete("abc-test.txt").await.unwrap();
        assert!(!store.exists("abc-test.txt").await);
        // Deleting a missing file is not an error.
        store.delete("abc-test.txt").await.unwrap();
    }

    #[tokio::test]
    async fn keys_cannot_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();
        assert!(store.read_bytes("../etc/passwd").await.is_err());
        assert!(store.read_bytes("a/b").await.is_err());
    }

    #[tokio::test]
    async fn missing_file_reads_as_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).await.unwrap();
        let err = store.read_bytes("nope.txt").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
