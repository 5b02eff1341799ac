//! Bitmap Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;

/// A bitmap error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for bitmap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// None of these are fatal for a thumbnail's record: a thumbnail whose pixels
/// can't be recovered is still reported, just without an image.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The thumbnail record has no value for a pixel region field.
    #[display("missing pixel region field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// A pixel region field is not a (positive) integer.
    #[display("pixel region field {field} is not a valid integer: {value:?}")]
    NotAnInteger { field: &'static str, value: String },
    /// Fewer than 8 bits per pixel would mean zero bytes per pixel.
    #[display("unsupported pixel depth: {_0} bits per pixel")]
    UnsupportedDepth(#[error(not(source))] u32),
    /// The bitmap store ends before the pixel region does.
    #[display("short read at offset {offset}: expected {expected} bytes, found {found}")]
    ShortRead { offset: u64, expected: u64, found: u64 },
    /// Pixel buffers are made of whole 4-byte pixels.
    #[display("pixel buffer length {_0} is not a multiple of 4")]
    InvalidBufferLength(#[error(not(source))] usize),
    /// The pixels could not be turned into a PNG image.
    #[display("image encoding failed: {_0}")]
    Encoding(#[error(not(source))] String),
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
