//! Real file system implementation.

use std::io::ErrorKind;
use std::path::Path;

use apiprobe_application::ports::{FileSystem, FileSystemError};
use tokio::fs;

/// Real file system implementation using `tokio::fs`.
#[derive(Debug, Clone, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    /// Creates a new `TokioFileSystem`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FileSystem for TokioFileSystem {
    async fn read_file_string(&self, path: &Path) -> Result<String, FileSystemError> {
        fs::read_to_string(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => FileSystemError::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => FileSystemError::PermissionDenied(path.to_path_buf()),
            ErrorKind::InvalidData => FileSystemError::InvalidUtf8(path.to_path_buf()),
            _ => FileSystemError::Io(e),
        })
    }
}
