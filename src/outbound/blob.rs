//! Storage for uploaded files

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid blob name '{0}'")]
    InvalidName(String),

    #[error("failed to write blob '{name}': {message}")]
    Write { name: String, message: String },
}

#[async_trait]
pub trait BlobWriter: Send + Sync {
    /// Store `bytes` under a flat file name, replacing any previous content
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), BlobError>;
}

/// Names must be a single normal path component
fn check_name(name: &str) -> Result<(), BlobError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(BlobError::InvalidName(name.to_string())),
    }
}

/// Writes files into a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FsBlobWriter {
    root: PathBuf,
}

impl FsBlobWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl BlobWriter for FsBlobWriter {
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), BlobError> {
        check_name(name)?;
        let write_error = |e: std::io::Error| BlobError::Write {
            name: name.to_string(),
            message: e.to_string(),
        };

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(write_error)?;
        tokio::fs::write(self.root.join(name), bytes)
            .await
            .map_err(write_error)?;

        tracing::debug!(name, size = bytes.len(), "blob written");
        Ok(())
    }
}

/// Keeps blobs in memory; can be switched to fail every write
#[derive(Debug, Default)]
pub struct MemoryBlobWriter {
    files: Mutex<HashMap<String, Vec<u8>>>,
    failing: AtomicBool,
}

impl MemoryBlobWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .ok()
            .and_then(|files| files.get(name).cloned())
    }
}

#[async_trait]
impl BlobWriter for MemoryBlobWriter {
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), BlobError> {
        check_name(name)?;
        if self.failing.load(Ordering::SeqCst) {
            return Err(BlobError::Write {
                name: name.to_string(),
                message: "memory blob writer set to fail".to_string(),
            });
        }
        self.files
            .lock()
            .map_err(|e| BlobError::Write {
                name: name.to_string(),
                message: e.to_string(),
            })?
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_writer_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("uploads");
        let writer = FsBlobWriter::new(&root);

        writer.write("photo_1.jpg", b"jpeg").await.unwrap();
        writer.write("photo_1.jpg", b"png").await.unwrap();

        let stored = std::fs::read(root.join("photo_1.jpg")).unwrap();
        assert_eq!(stored, b"png");
    }

    #[tokio::test]
    async fn test_names_cannot_escape_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FsBlobWriter::new(dir.path());
        for name in ["../evil.jpg", "a/b.jpg", "/abs.jpg", ""] {
            assert!(matches!(
                writer.write(name, b"x").await,
                Err(BlobError::InvalidName(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_memory_writer_roundtrip_and_failure() {
        let writer = MemoryBlobWriter::new();
        writer.write("a.png", b"data").await.unwrap();
        assert_eq!(writer.get("a.png"), Some(b"data".to_vec()));

        writer.set_failing(true);
        assert!(writer.write("b.png", b"data").await.is_err());
        assert_eq!(writer.get("b.png"), None);
    }
}
