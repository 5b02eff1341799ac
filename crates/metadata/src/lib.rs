//! Per-file metadata for QuickLook thumbnail cache entries.
//!
//! Each files-table row names a property list through its `version` field
//! (`<binary 6A3F0C>` names the property list `6A3F0C`). That property list
//! holds the file's size, its modification time as Mac absolute time, and the
//! generator that produced its thumbnail.

pub mod error;
mod mac_time;
mod property_list;
mod resolver;

pub use crate::mac_time::{MAC_ABSOLUTE_TIME_EPOCH, format_utc, mac_absolute_time};
pub use crate::property_list::{FileMetadata, PLIST_DATE, PLIST_GENERATOR, PLIST_SIZE, parse_plist, plist_name};
pub use crate::resolver::{Resolver, VERSION};
