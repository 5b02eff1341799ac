use derive_more::Display;
use std::num::NonZeroU32;
use std::sync::Arc;

/// 1-based ordinal position of a data row within its table.
///
/// Identifiers are dense and assigned in input order; the header line is not
/// counted. The QuickLook `files` table uses the same convention for its
/// internal row ids, which is what the thumbnails table's `file_id` refers to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(NonZeroU32);
impl RowId {
    /// Returns `None` for zero, which is never a valid row.
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    /// Converts a foreign key read from another table. Zero, negative and
    /// out-of-range values can never name a row.
    pub fn from_key(key: i64) -> Option<Self> {
        u32::try_from(key).ok().and_then(Self::new)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index + 1).ok().and_then(Self::new)
    }

    pub(crate) fn index(self) -> usize {
        // u32 always fits in usize on the platforms we build for.
        self.0.get() as usize - 1
    }
}
/// One data row: an ordered mapping from header field name to raw value.
///
/// The header is shared between all records of a table, so a record only
/// owns its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRecord {
    header: Arc<[String]>,
    values: Vec<String>,
}
impl TableRecord {
    pub(crate) fn new(header: Arc<[String]>, values: Vec<String>) -> Self {
        debug_assert_eq!(header.len(), values.len());
        Self { header, values }
    }

    /// Raw value of `field`, or `None` if the table has no such column.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.header.iter().position(|name| name == field).map(|i| self.values[i].as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.header.iter().any(|name| name == field)
    }

    /// Field/value pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.header.iter().map(String::as_str).zip(self.values.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
