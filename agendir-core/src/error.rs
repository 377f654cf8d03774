//! Error types for the agendir core.

use thiserror::Error;

/// Errors that can occur in agendir core operations.
///
/// Remote-apply failures have their own taxonomy ([`crate::sync::SyncFailure`])
/// because they drive retry policy rather than bubbling up to the caller.
#[derive(Error, Debug)]
pub enum AgendirError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for agendir core operations.
pub type AgendirResult<T> = Result<T, AgendirError>;
