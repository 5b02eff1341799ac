//! Metadata Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A metadata error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// All of these are fatal for the one record being resolved, and only for
/// that record.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required field is absent from the files record or the property list.
    #[display("missing field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// A field that must be an integer isn't one.
    #[display("field {field} is not a valid integer: {value:?}")]
    NotAnInteger { field: &'static str, value: String },
    /// A timestamp that can't be represented as a date.
    #[display("timestamp out of range: {_0}")]
    TimestampOutOfRange(#[error(not(source))] i64),
    /// No property list is named after the record's version.
    #[display("no property list named {_0:?}")]
    NotFound(#[error(not(source))] String),
    /// Several property lists are named after the record's version.
    #[display("more than one property list named {_0:?}")]
    AmbiguousResult(#[error(not(source))] String),
    /// An instant couldn't be rendered as text.
    #[display("timestamp could not be formatted")]
    Format,
    /// The property list was found but couldn't be read.
    #[display("property list {_0:?} could not be read")]
    Unreadable(#[error(not(source))] String),
    /// The property list is not well-formed, or isn't a dictionary.
    #[display("malformed property list")]
    PlistParse,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Artifact reads may fail transiently; everything else is about data.
        matches!(self, Self::Unreadable(_))
    }
}
