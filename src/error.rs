//! Error types for the NoteMark core.
//!
//! This module defines all error types used throughout the library.
//!
//! User-driven outcomes (a cancelled dialog, a save path outside the notes
//! root) are not errors: the operations involved report them as benign
//! results instead. Corrupt sidecar or sync-state files are recovered
//! internally and never surface here either.

use thiserror::Error;

/// Result type alias for NoteMark operations
pub type NoteResult<T> = Result<T, NoteError>;

/// Main error type for NoteMark operations
#[derive(Error, Debug)]
pub enum NoteError {
    #[error("Note not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication required: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Sync error: {0}")]
    Sync(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NoteError {
    /// Create a new sync error
    pub fn sync(message: impl Into<String>) -> Self {
        NoteError::Sync(message.into())
    }

    /// Create a new network error
    pub fn network(message: impl Into<String>) -> Self {
        NoteError::Network(message.into())
    }

    /// Create a new authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        NoteError::Auth(message.into())
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        NoteError::Config(message.into())
    }

    /// True for errors caused by a missing note file
    pub fn is_not_found(&self) -> bool {
        matches!(self, NoteError::NotFound(_))
    }
}
