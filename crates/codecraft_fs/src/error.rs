//! Error types for the file-system layer.

use thiserror::Error;

/// Result type alias for file-system operations.
pub type FsResult<T> = Result<T, FsError>;

/// Errors that can occur while talking to a storage provider.
#[derive(Error, Debug)]
pub enum FsError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Directory selection was cancelled")]
    UserCancelled,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Entry has the wrong kind: {0}")]
    TypeMismatch(String),

    #[error("Invalid entry name: {0:?}")]
    InvalidName(String),

    #[error("No root directory is open")]
    RootNotOpen,

    #[error("Storage and cache diverged: {0}")]
    AlreadyInconsistent(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Storage provider error: {0}")]
    Provider(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FsError {
    /// Map an I/O error for `path` onto the closest provider-level error.
    pub fn from_io(err: std::io::Error, path: impl Into<String>) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.into()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.into()),
            _ => Self::Io(err),
        }
    }

    /// True for the errors that mean "nothing is there".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::RootNotOpen)
    }
}
