//! Thumbnail pixels from the QuickLook bitmap store.
//!
//! `thumbnails.data` is one flat blob of raw pixels. Each thumbnails-table
//! record points into it with a byte offset and length, and describes the
//! pixel layout with a bit depth, a row stride and a height. Pixels are read
//! out as a [`PixelRegion`], reordered from RGBA to ABGR, and encoded as PNG.

pub mod error;
mod encode;
mod region;

pub use crate::encode::{Thumbnail, decode, encode_png};
pub use crate::region::{
    BITMAP_DATA_LENGTH, BITMAP_DATA_OFFSET, BITS_PER_PIXEL, BYTES_PER_ROW, PixelRegion, REGION_FIELDS, THUMB_HEIGHT,
    extract, read_region, rgba_to_abgr,
};
