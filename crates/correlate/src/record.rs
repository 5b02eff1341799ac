use crate::error::{Error, ErrorKind};
use derive_more::Display;
use quicklook_bitmap::Thumbnail;
use quicklook_table::RowId;
use std::fmt::{Display as FmtDisplay, Formatter, Result as FmtResult};
use time::UtcDateTime;

/// The file a thumbnail was generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// `folder + "/" + file_name`, as recorded in the files table
    pub target: String,
    pub target_file_length: u64,
    pub target_modified_on: UtcDateTime,
    /// Raw `version` field, which also names the file's property list
    pub plist_version: String,
    pub generator: String,
    pub fs_id: String,
}

/// One reconstructed cache entry: a file, and its thumbnail if the cache has
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedRecord {
    /// Zero-based position among the records emitted so far
    pub ordinal: usize,
    pub file_id: RowId,
    pub link: Link,
    /// Decoded thumbnail image; `None` when the cache holds no usable pixels
    pub thumbnail: Option<Thumbnail>,
    /// Remaining thumbnail record fields, in table order; `None` for files
    /// without a thumbnail record
    pub properties: Option<Vec<(String, String)>>,
}
impl EmittedRecord {
    /// Name a caller should store this record under: `thumb-<ordinal>`.
    pub fn name(&self) -> String {
        format!("thumb-{}", self.ordinal)
    }
}

/// Which source row a record error is about.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    #[display("thumbnail row {_0}")]
    Thumbnail(RowId),
    #[display("file row {_0}")]
    File(RowId),
}

/// A logical record that could not be emitted.
#[derive(Debug)]
pub struct RecordError {
    subject: Subject,
    error: Error,
}
impl RecordError {
    pub(crate) fn new(subject: Subject, error: Error) -> Self {
        Self { subject, error }
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error
    }

    /// Full error tree, with locations.
    pub fn error(&self) -> &Error {
        &self.error
    }

    pub fn into_error(self) -> Error {
        self.error
    }

    /// See [`ErrorKind::is_integrity_defect`].
    pub fn is_integrity_defect(&self) -> bool {
        self.error.is_integrity_defect()
    }
}
impl FmtDisplay for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", self.subject, self.kind())
    }
}
