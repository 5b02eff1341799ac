use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use quicklook_table::TableRecord;
use std::io::{Read, Seek, SeekFrom};
use std::str::FromStr;
use tracing::instrument;

pub const BITMAP_DATA_OFFSET: &str = "bitmapdata_location";
pub const BITMAP_DATA_LENGTH: &str = "bitmapdata_length";
pub const BITS_PER_PIXEL: &str = "bitsperpixel";
pub const BYTES_PER_ROW: &str = "bytesperrow";
pub const THUMB_HEIGHT: &str = "height";

/// Every thumbnail-record field that describes a pixel region.
pub const REGION_FIELDS: [&str; 5] = [BITMAP_DATA_OFFSET, BITMAP_DATA_LENGTH, BITS_PER_PIXEL, BYTES_PER_ROW, THUMB_HEIGHT];

/// Where a thumbnail's pixels live in the bitmap store, and their shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub offset: u64,
    pub length: u64,
    pub bits_per_pixel: u32,
    pub bytes_per_row: u32,
    pub height: u32,
}
impl PixelRegion {
    /// Read a pixel region from a thumbnails-table record.
    ///
    /// The offset may be zero (the first thumbnail in the store); every other
    /// field must be a positive integer.
    pub fn from_record(record: &TableRecord) -> Result<Self> {
        let region = Self {
            offset: integer(record, BITMAP_DATA_OFFSET, true)?,
            length: integer(record, BITMAP_DATA_LENGTH, false)?,
            bits_per_pixel: integer(record, BITS_PER_PIXEL, false)?,
            bytes_per_row: integer(record, BYTES_PER_ROW, false)?,
            height: integer(record, THUMB_HEIGHT, false)?,
        };
        if region.bits_per_pixel < 8 {
            exn::bail!(ErrorKind::UnsupportedDepth(region.bits_per_pixel));
        }
        Ok(region)
    }

    /// Pixels per row.
    ///
    /// Integer division: a row stride that isn't a whole number of pixels is
    /// truncated, as the cache's own reader does.
    pub fn width(&self) -> u32 {
        self.bytes_per_row / (self.bits_per_pixel / 8)
    }
}

fn integer<T: FromStr + PartialOrd + Default>(record: &TableRecord, name: &'static str, allow_zero: bool) -> Result<T> {
    let value = record.get(name).ok_or_raise(|| ErrorKind::MissingField(name))?;
    match value.trim().parse::<T>() {
        Ok(n) if allow_zero || n > T::default() => Ok(n),
        _ => exn::bail!(ErrorKind::NotAnInteger {
            field: name,
            value: value.to_string(),
        }),
    }
}

/// Read exactly `length` bytes starting at `offset`.
pub fn read_region<R: Read + Seek>(reader: &mut R, offset: u64, length: u64) -> Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(offset)).map_err(ErrorKind::Io)?;
    let mut buffer = Vec::new();
    let found = reader.by_ref().take(length).read_to_end(&mut buffer).map_err(ErrorKind::Io)? as u64;
    if found < length {
        exn::bail!(ErrorKind::ShortRead {
            offset,
            expected: length,
            found,
        });
    }
    Ok(buffer)
}

/// Reverse the channel order of every pixel in place: `[r,g,b,a]` becomes
/// `[a,b,g,r]`. Applying it twice is a no-op.
pub fn rgba_to_abgr(pixels: &mut [u8]) -> Result<()> {
    if pixels.len() % 4 != 0 {
        exn::bail!(ErrorKind::InvalidBufferLength(pixels.len()));
    }
    pixels.chunks_exact_mut(4).for_each(|pixel| pixel.reverse());
    Ok(())
}

/// Read a region's pixels and reorder them to ABGR.
#[instrument(level = "debug", skip(reader), fields(offset = region.offset, length = region.length))]
pub fn extract<R: Read + Seek>(reader: &mut R, region: &PixelRegion) -> Result<Vec<u8>> {
    let mut pixels = read_region(reader, region.offset, region.length)?;
    rgba_to_abgr(&mut pixels)?;
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicklook_table::Table;
    use rstest::rstest;
    use std::io::Cursor;

    fn record(csv: &str) -> TableRecord {
        let table = Table::parse(csv).unwrap();
        table.iter().next().unwrap().1.clone()
    }

    #[test]
    fn test_from_record() {
        let record = record(
            "file_id,bitmapdata_location,bitmapdata_length,bitsperpixel,bytesperrow,height\n\
             1,0,64,32,16,4\n",
        );
        let region = PixelRegion::from_record(&record).unwrap();
        assert_eq!(
            region,
            PixelRegion {
                offset: 0,
                length: 64,
                bits_per_pixel: 32,
                bytes_per_row: 16,
                height: 4,
            }
        );
        assert_eq!(region.width(), 4);
    }

    #[rstest]
    #[case("1,0,64,32,16", "missing")]
    #[case("1,0,sixty,32,16,4", "integer")]
    #[case("1,0,-64,32,16,4", "integer")]
    #[case("1,0,0,32,16,4", "integer")]
    #[case("1,0,64,4,16,4", "depth")]
    fn test_from_record_invalid(#[case] row: &str, #[case] expected: &str) {
        let header = if expected == "missing" {
            "file_id,bitmapdata_location,bitmapdata_length,bitsperpixel,bytesperrow"
        } else {
            "file_id,bitmapdata_location,bitmapdata_length,bitsperpixel,bytesperrow,height"
        };
        let err = PixelRegion::from_record(&record(&format!("{header}\n{row}\n"))).unwrap_err();
        match expected {
            "missing" => assert!(matches!(&*err, ErrorKind::MissingField(THUMB_HEIGHT))),
            "integer" => assert!(matches!(&*err, ErrorKind::NotAnInteger { field: BITMAP_DATA_LENGTH, .. })),
            _ => assert!(matches!(&*err, ErrorKind::UnsupportedDepth(4))),
        }
    }

    #[rstest]
    #[case(16, 32, 4)]
    #[case(17, 32, 4)]
    #[case(30, 24, 10)]
    #[case(9, 8, 9)]
    fn test_width_truncates(#[case] bytes_per_row: u32, #[case] bits_per_pixel: u32, #[case] expected: u32) {
        let region = PixelRegion {
            offset: 0,
            length: 4,
            bits_per_pixel,
            bytes_per_row,
            height: 1,
        };
        assert_eq!(region.width(), expected);
    }

    #[test]
    fn test_rgba_to_abgr_involution() {
        let mut pixels = [1, 2, 3, 4];
        rgba_to_abgr(&mut pixels).unwrap();
        assert_eq!(pixels, [4, 3, 2, 1]);
        rgba_to_abgr(&mut pixels).unwrap();
        assert_eq!(pixels, [1, 2, 3, 4]);

        let mut pixels = [10, 20, 30, 40, 50, 60, 70, 80];
        rgba_to_abgr(&mut pixels).unwrap();
        assert_eq!(pixels, [40, 30, 20, 10, 80, 70, 60, 50]);
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(7)]
    fn test_rgba_to_abgr_invalid_length(#[case] length: usize) {
        let mut pixels = vec![0u8; length];
        let err = rgba_to_abgr(&mut pixels).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidBufferLength(l) if *l == length));
    }

    #[test]
    fn test_read_region() {
        let mut reader = Cursor::new((0u8..16).collect::<Vec<_>>());
        assert_eq!(read_region(&mut reader, 4, 4).unwrap(), [4, 5, 6, 7]);
        assert_eq!(read_region(&mut reader, 0, 0).unwrap(), Vec::<u8>::new());
    }

    #[rstest]
    #[case(12, 8, 4)]
    #[case(16, 4, 0)]
    #[case(100, 4, 0)]
    fn test_read_region_short(#[case] offset: u64, #[case] length: u64, #[case] found: u64) {
        let mut reader = Cursor::new((0u8..16).collect::<Vec<_>>());
        let err = read_region(&mut reader, offset, length).unwrap_err();
        assert!(matches!(&*err, ErrorKind::ShortRead { found: f, .. } if *f == found));
    }

    #[test]
    fn test_extract() {
        let mut reader = Cursor::new(vec![0, 0, 1, 2, 3, 4, 5, 6, 7, 8]);
        let region = PixelRegion {
            offset: 2,
            length: 8,
            bits_per_pixel: 32,
            bytes_per_row: 8,
            height: 1,
        };
        assert_eq!(extract(&mut reader, &region).unwrap(), [4, 3, 2, 1, 8, 7, 6, 5]);
    }

    #[test]
    fn test_extract_invalid_length() {
        let mut reader = Cursor::new(vec![0u8; 16]);
        let region = PixelRegion {
            offset: 0,
            length: 6,
            bits_per_pixel: 32,
            bytes_per_row: 4,
            height: 1,
        };
        let err = extract(&mut reader, &region).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidBufferLength(6)));
    }
}
