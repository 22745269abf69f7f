//! Error types for upload storage.

use thiserror::Error;

/// Upload storage error type.
#[derive(Debug, Error)]
pub enum FilesError {
    /// The upload id is not in the manager's known set.
    #[error("upload not found: {0}")]
    NotFound(String),

    /// Another lease is outstanding for this upload id. A deliberate
    /// conflict signal, not a wait.
    #[error("upload busy: {0}")]
    Busy(String),

    /// One of the pair's files could not be created or written.
    #[error("bad descriptor: {0}")]
    BadDescriptor(#[source] std::io::Error),

    /// Any other I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for storage operations.
pub type FilesResult<T> = std::result::Result<T, FilesError>;
