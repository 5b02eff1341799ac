//! Reconstruction of QuickLook thumbnail cache entries.
//!
//! A cache is a bitmap store plus two tables: `thumbnails`, whose rows point
//! into the bitmap store and reference a file by `file_id`, and `files`,
//! whose rows name a file and its property list. [`correlate`] joins the two
//! into one [`EmittedRecord`] per file, thumbnail or not.
//!
//! ```
//! use quicklook_correlate::{CacheLayout, ThumbnailCache, discover};
//! use quicklook_search::ArtifactSearcher;
//! use quicklook_table::TableParser;
//!
//! fn count(searcher: &dyn ArtifactSearcher) -> quicklook_correlate::error::Result<usize> {
//!     let layout = CacheLayout::default();
//!     let mut records = 0;
//!     for bitmap in discover(searcher, &layout)? {
//!         let mut cache = ThumbnailCache::open(searcher, bitmap, &layout, &TableParser::default())?;
//!         records += cache.correlate(searcher).filter(Result::is_ok).count();
//!     }
//!     Ok(records)
//! }
//! ```

mod cache;
mod correlation;
pub mod error;
mod record;

pub use crate::cache::{BITMAP_NAME, CacheLayout, DATABASE_NAME, FILES_TABLE, THUMBNAILS_TABLE, ThumbnailCache, discover};
pub use crate::correlation::{Correlation, FILE_ID, FILE_NAME, FOLDER, FS_ID, LAST_HIT_DATE, correlate};
pub use crate::record::{EmittedRecord, Link, RecordError, Subject};
