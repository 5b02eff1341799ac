//! Artifact models.

use derive_more::Display;
use memchr::memmem;
use std::path::{Path, PathBuf};

/// How many leading bytes [`FileType::from_magic_bytes`] wants to see.
pub const MAGIC_BYTES_LENGTH: usize = 256;

/// The type an artifact was classified as.
///
/// Property lists are always classified as [`BinaryPlist`](Self::BinaryPlist),
/// whatever their encoding: extraction tooling converts binary plists to XML
/// but keeps the original classification.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    #[display("Comma Separated Values")]
    CommaSeparatedValues,
    #[display("Tab Separated Values")]
    TabSeparatedValues,
    #[display("Binary Plist")]
    BinaryPlist,
    #[display("raw")]
    Raw,
}
impl FileType {
    /// Classifies by file extension alone; `None` if the extension says nothing.
    pub fn from_extension(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(Self::CommaSeparatedValues),
            "tsv" => Some(Self::TabSeparatedValues),
            "plist" => Some(Self::BinaryPlist),
            _ => None,
        }
    }

    /// Classifies by content: property lists, binary or XML, then delimited
    /// text tables (table dumps are often exported without an extension).
    pub fn from_magic_bytes(head: &[u8]) -> Option<Self> {
        if head.starts_with(b"bplist00") {
            return Some(Self::BinaryPlist);
        }
        let head = head.strip_prefix(b"\xef\xbb\xbf").unwrap_or(head);
        let start = head.iter().position(|b| !b.is_ascii_whitespace())?;
        if head[start] == b'<' && memmem::find(&head[start..], b"plist").is_some() {
            return Some(Self::BinaryPlist);
        }
        Self::sniff_table(head)
    }

    /// Text whose first line holds a delimiter. A comma wins over a tab.
    fn sniff_table(head: &[u8]) -> Option<Self> {
        let text = match std::str::from_utf8(head) {
            Ok(text) => text,
            // Head cut off in the middle of a character.
            Err(err) if err.error_len().is_none() => std::str::from_utf8(&head[..err.valid_up_to()]).ok()?,
            Err(_) => return None,
        };
        if text.chars().any(|c| c.is_control() && !matches!(c, '\t' | '\r' | '\n')) {
            return None;
        }
        let header = text.lines().next()?;
        if header.contains(',') {
            Some(Self::CommaSeparatedValues)
        } else if header.contains('\t') {
            Some(Self::TabSeparatedValues)
        } else {
            None
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Self::CommaSeparatedValues | Self::TabSeparatedValues)
    }
}

/// An artifact known to a searcher: where it lives and what it is.
///
/// The data itself is fetched separately via
/// [`ArtifactSearcher::read`](crate::ArtifactSearcher::read) or
/// [`ArtifactSearcher::reader`](crate::ArtifactSearcher::reader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the searcher's root
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    pub file_type: FileType,
}
impl Artifact {
    pub fn new(path: impl Into<PathBuf>, size: u64, file_type: FileType) -> Self {
        Self {
            path: path.into(),
            size,
            file_type,
        }
    }

    /// Final path component, if it is valid UTF-8.
    pub fn name(&self) -> Option<&str> {
        self.path.file_name()?.to_str()
    }

    /// Final path component without its extension, if it is valid UTF-8.
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem()?.to_str()
    }
}
