use crate::error::{ErrorKind, Result};
use crate::mac_time::mac_absolute_time;
use exn::{OptionExt, ResultExt};
use plist::{Dictionary, Value};
use std::io::Cursor;
use time::UtcDateTime;

pub const PLIST_SIZE: &str = "size";
pub const PLIST_DATE: &str = "date";
pub const PLIST_GENERATOR: &str = "gen";

/// What the cache remembers about a file, from its property list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// File length in bytes
    pub size: u64,
    pub modified: UtcDateTime,
    /// Identifier of the thumbnail generator that processed the file
    pub generator: String,
}

/// Name of the property list belonging to a files record's `version`.
///
/// ```
/// assert_eq!(quicklook_metadata::plist_name("<binary 6A3F0C>"), "6A3F0C");
/// ```
pub fn plist_name(version: &str) -> String {
    version.replace("<binary ", "").replace('>', "")
}

/// Parse a file's property list, XML or binary.
pub fn parse_plist(bytes: &[u8]) -> Result<FileMetadata> {
    let value = Value::from_reader(Cursor::new(bytes)).or_raise(|| ErrorKind::PlistParse)?;
    let dictionary = value.as_dictionary().ok_or_raise(|| ErrorKind::PlistParse)?;

    let size = scalar(dictionary, PLIST_SIZE)?;
    let size = size.trim().parse::<u64>().or_raise(|| ErrorKind::NotAnInteger {
        field: PLIST_SIZE,
        value: size.clone(),
    })?;
    Ok(FileMetadata {
        size,
        modified: mac_absolute_time(&scalar(dictionary, PLIST_DATE)?)?,
        generator: scalar(dictionary, PLIST_GENERATOR)?,
    })
}

/// A scalar value, as a string.
fn scalar(dictionary: &Dictionary, key: &'static str) -> Result<String> {
    match dictionary.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Integer(value)) => Ok(value.to_string()),
        Some(Value::Real(value)) => Ok(value.to_string()),
        Some(Value::Boolean(value)) => Ok(value.to_string()),
        Some(_) => exn::bail!(ErrorKind::PlistParse),
        None => exn::bail!(ErrorKind::MissingField(key)),
    }
}
