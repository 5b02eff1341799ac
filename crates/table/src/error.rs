//! Table Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A table parsing error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for table parsing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Every variant aborts the whole table: a partially parsed table would hand
/// out row identifiers that no longer line up with the source rows.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input has no header line at all.
    #[display("missing header line")]
    MissingHeader,
    /// The header names the same field twice.
    #[display("duplicate field in header: {_0}")]
    DuplicateField(#[error(not(source))] String),
    /// A data row does not have one value per header field.
    #[display("malformed row {row}: expected {expected} fields, found {found}")]
    MalformedRow {
        /// 1-based row identifier (header excluded).
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The input bytes are either a well-formed table or they aren't.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::MissingHeader.to_string(), "missing header line");
        assert_eq!(
            ErrorKind::MalformedRow { row: 3, expected: 4, found: 5 }.to_string(),
            "malformed row 3: expected 4 fields, found 5"
        );
    }
}
