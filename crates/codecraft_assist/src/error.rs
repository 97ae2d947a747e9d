//! Error types for the assistant.

use std::fmt;

use thiserror::Error;

/// Result type alias for assistant operations.
pub type AssistResult<T> = Result<T, AssistError>;

/// A value the interpreter needs from the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    Filename,
    Content,
    DirectoryName,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filename => write!(f, "filename"),
            Self::Content => write!(f, "content"),
            Self::DirectoryName => write!(f, "directory name"),
        }
    }
}

/// Errors that can occur while handling a chat message.
#[derive(Error, Debug)]
pub enum AssistError {
    #[error("Missing parameter: {0}")]
    MissingParameter(Parameter),

    #[error("No file is currently open")]
    NoOpenFile,

    #[error("File operation failed on {0}")]
    OperationFailed(String),

    #[error("Responder error: {0}")]
    Responder(String),
}
