//! PNG and JPEG encoding into a caller-provided region.
//!
//! Both encoders come from the `image` crate. Output goes through
//! [`BoundedWriter`], which refuses any write that would not fit, so the
//! encoded stream lands in place and the region is never overrun.

use super::EngineError;
use crate::color::ColorFormat;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::ImageEncoder;
use std::io::{self, Write};

/// A `Write` sink over a fixed slice. Writes are all-or-nothing.
struct BoundedWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
    overflowed: bool,
}

impl<'a> BoundedWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            overflowed: false,
        }
    }
}

impl Write for BoundedWriter<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let end = match self.pos.checked_add(data.len()) {
            Some(end) if end <= self.buf.len() => end,
            _ => {
                self.overflowed = true;
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "output capacity exceeded",
                ));
            }
        };
        self.buf[self.pos..end].copy_from_slice(data);
        self.pos = end;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Encode `pixels` into `out`, returning the number of bytes written.
///
/// `pixels` must hold exactly `width * height * format.depth()` bytes.
/// `quality` is clamped to 1..=100 and only used for JPEG.
pub(crate) fn encode_into(
    pixels: &[u8],
    width: u32,
    height: u32,
    format: ColorFormat,
    png: bool,
    quality: u8,
    out: &mut [u8],
) -> Result<usize, EngineError> {
    let capacity = out.len();
    let mut writer = BoundedWriter::new(out);
    let color = format.to_image_color();

    let result = if png {
        PngEncoder::new(&mut writer).write_image(pixels, width, height, color)
    } else {
        JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100))
            .write_image(pixels, width, height, color)
    };

    // The PNG writer drops its trailing chunk errors, so the flag is checked
    // even when the encoder reports success.
    if writer.overflowed {
        return Err(EngineError::CapacityExceeded { capacity });
    }
    result.map_err(|e| EngineError::Codec(e.to_string()))?;
    Ok(writer.pos)
}
