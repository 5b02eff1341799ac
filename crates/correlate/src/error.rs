//! Correlation Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use quicklook_metadata::error::ErrorKind as MetadataErrorKind;
use quicklook_table::RowId;
use std::path::PathBuf;

/// A correlation error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for correlation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Record-scoped kinds are reported through
/// [`RecordError`](crate::RecordError) and never stop a correlation; the
/// cache-scoped kinds stop a cache from being opened at all.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A record lacks a field needed to correlate it.
    #[display("missing field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// A thumbnail's `file_id` is not an integer.
    #[display("field {field} is not a valid integer: {value:?}")]
    NotAnInteger { field: &'static str, value: String },
    /// A thumbnail references a file that isn't in the files table.
    #[display("thumbnail references file {_0}, which is not in the files table")]
    DanglingForeignKey(#[error(not(source))] i64),
    /// A thumbnail references a file already claimed by an earlier thumbnail.
    #[display("file {file} is already referenced by thumbnail {claimed_by}")]
    DuplicateForeignKey { file: RowId, claimed_by: RowId },
    /// The file's property list could not be resolved; `cause` says why
    /// (not found, ambiguous, malformed, ...).
    #[display("metadata for file {file} could not be resolved: {cause}")]
    Metadata {
        file: RowId,
        #[error(not(source))]
        cause: MetadataErrorKind,
    },
    /// A cache table could not be located (absent, or not unique).
    #[display("cannot locate table {table} at {}", path.display())]
    TableLookup { table: String, path: PathBuf },
    /// A cache table was located but could not be read or parsed.
    #[display("cannot read table {_0}")]
    Table(#[error(not(source))] String),
    /// The bitmap store could not be opened.
    #[display("cannot open bitmap store {}", _0.display())]
    Bitmap(#[error(not(source))] PathBuf),
    /// The searcher failed while looking for caches.
    #[display("cache discovery failed")]
    Discovery,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Metadata { cause, .. } => cause.is_retryable(),
            _ => matches!(self, Self::Bitmap(_) | Self::Discovery),
        }
    }

    /// Structural inconsistency between the two tables: the data is damaged
    /// or was exported inconsistently, retrying won't help.
    pub fn is_integrity_defect(&self) -> bool {
        matches!(self, Self::DanglingForeignKey(_) | Self::DuplicateForeignKey { .. })
    }
}
