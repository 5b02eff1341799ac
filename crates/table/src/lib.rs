//! Delimited table dumps of the QuickLook `index.sqlite` tables.
//!
//! Upstream tooling exports the cache database's `files` and `thumbnails`
//! tables as delimited text: one unquoted header line followed by one line
//! per row, where values containing the delimiter are wrapped in quotes.
//! [`TableParser`] turns such a dump into a [`Table`] of [`TableRecord`]s
//! keyed by their 1-based [`RowId`].

pub mod error;
mod record;
mod split;
mod table;

pub use crate::record::{RowId, TableRecord};
pub use crate::split::split_quoted;
pub use crate::table::{DEFAULT_DELIMITER, DEFAULT_QUOTE, Table, TableParser};
