use crate::error::{ErrorKind, Result};
use crate::region::{PixelRegion, extract};
use exn::ResultExt;
use image::{ImageFormat, RgbaImage};
use std::io::{Cursor, Read, Seek};
use tracing::instrument;

/// A decoded thumbnail, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// PNG-encoded image
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// BLAKE3 digest of `png`, hex encoded
    pub blake3: String,
}

/// Encode an ABGR pixel buffer as a PNG image.
///
/// The buffer must hold exactly `width * height` pixels. The image is written
/// as-is: no resizing, no colour conversion.
pub fn encode_png(abgr: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let expected = (width as usize).checked_mul(height as usize).and_then(|pixels| pixels.checked_mul(4));
    if expected != Some(abgr.len()) {
        exn::bail!(ErrorKind::Encoding(format!(
            "{} byte buffer does not hold a {width}x{height} image",
            abgr.len()
        )));
    }
    if width == 0 || height == 0 {
        exn::bail!(ErrorKind::Encoding(format!("empty {width}x{height} image")));
    }
    let mut rgba = abgr.to_vec();
    rgba.chunks_exact_mut(4).for_each(|pixel| pixel.reverse());
    let image = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| exn::Exn::from(ErrorKind::Encoding(format!("buffer too small for {width}x{height}"))))?;
    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, ImageFormat::Png)
        .or_raise(|| ErrorKind::Encoding("PNG serialization failed".to_string()))?;
    Ok(png.into_inner())
}

/// Extract a thumbnail's pixels from the bitmap store and encode them.
#[instrument(level = "debug", skip(reader), fields(width = region.width(), height = region.height, bytes))]
pub fn decode<R: Read + Seek>(reader: &mut R, region: &PixelRegion) -> Result<Thumbnail> {
    let pixels = extract(reader, region)?;
    let png = encode_png(&pixels, region.width(), region.height)?;
    tracing::Span::current().record("bytes", png.len());
    Ok(Thumbnail {
        blake3: blake3::hash(&png).to_string(),
        png,
        width: region.width(),
        height: region.height,
    })
}
