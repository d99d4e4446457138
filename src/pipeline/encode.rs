//! Image encoding: `DynamicImage` → PNG bytes.
//!
//! Embedded PDF images arrive in whatever filter the producer chose (DCT,
//! Flate, JPX, …). pdfium decodes them to a bitmap; re-encoding every one as
//! PNG gives the transcoder a single, lossless input format so the frame
//! pattern `frame%03d.png` matches all of them.

use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode one decoded image as PNG.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} image → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}
