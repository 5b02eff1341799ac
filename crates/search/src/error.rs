//! Search Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A search error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A query that must match exactly one artifact matched none.
    #[display("no artifact matches query: {_0}")]
    NoMatch(#[error(not(source))] String),
    /// A query that must match exactly one artifact matched several.
    #[display("more than one artifact matches query: {_0}")]
    Ambiguous(#[error(not(source))] String),
    /// The artifact's data is gone (deleted after indexing, or never stored).
    #[display("artifact not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied (permissions)
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Path contains invalid characters or escapes the search root
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
