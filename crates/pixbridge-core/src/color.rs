//! Color formats and their per-pixel byte depth.
//!
//! The numeric tag of each variant is the value carried across the ABI in
//! [`RawImageDescriptor::color_type`](crate::abi::RawImageDescriptor), so the
//! discriminants are fixed and must never be reordered.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Pixel layout of a raw image buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ColorFormat {
    /// 8-bit luminance.
    L8 = 0,
    /// 8-bit luminance with alpha.
    La8 = 1,
    /// 8-bit RGB.
    #[default]
    Rgb8 = 2,
    /// 8-bit RGBA.
    Rgba8 = 3,
    /// 16-bit luminance.
    L16 = 4,
    /// 16-bit luminance with alpha.
    La16 = 5,
    /// 16-bit RGB.
    Rgb16 = 6,
    /// 16-bit RGBA.
    Rgba16 = 7,
    /// 32-bit float RGB.
    Rgb32F = 8,
    /// 32-bit float RGBA.
    Rgba32F = 9,
}

impl ColorFormat {
    /// Every format, in tag order.
    pub const ALL: [ColorFormat; 10] = [
        ColorFormat::L8,
        ColorFormat::La8,
        ColorFormat::Rgb8,
        ColorFormat::Rgba8,
        ColorFormat::L16,
        ColorFormat::La16,
        ColorFormat::Rgb16,
        ColorFormat::Rgba16,
        ColorFormat::Rgb32F,
        ColorFormat::Rgba32F,
    ];

    /// Bytes per pixel.
    pub const fn depth(self) -> usize {
        match self {
            ColorFormat::L8 => 1,
            ColorFormat::La8 | ColorFormat::L16 => 2,
            ColorFormat::Rgb8 => 3,
            ColorFormat::Rgba8 | ColorFormat::La16 => 4,
            ColorFormat::Rgb16 => 6,
            ColorFormat::Rgba16 => 8,
            ColorFormat::Rgb32F => 12,
            ColorFormat::Rgba32F => 16,
        }
    }

    /// Number of channels per pixel.
    pub const fn channels(self) -> usize {
        match self {
            ColorFormat::L8 | ColorFormat::L16 => 1,
            ColorFormat::La8 | ColorFormat::La16 => 2,
            ColorFormat::Rgb8 | ColorFormat::Rgb16 | ColorFormat::Rgb32F => 3,
            ColorFormat::Rgba8 | ColorFormat::Rgba16 | ColorFormat::Rgba32F => 4,
        }
    }

    /// The wire tag for this format.
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Convert to the image crate's color type.
    pub(crate) fn to_image_color(self) -> image::ExtendedColorType {
        match self {
            ColorFormat::L8 => image::ExtendedColorType::L8,
            ColorFormat::La8 => image::ExtendedColorType::La8,
            ColorFormat::Rgb8 => image::ExtendedColorType::Rgb8,
            ColorFormat::Rgba8 => image::ExtendedColorType::Rgba8,
            ColorFormat::L16 => image::ExtendedColorType::L16,
            ColorFormat::La16 => image::ExtendedColorType::La16,
            ColorFormat::Rgb16 => image::ExtendedColorType::Rgb16,
            ColorFormat::Rgba16 => image::ExtendedColorType::Rgba16,
            ColorFormat::Rgb32F => image::ExtendedColorType::Rgb32F,
            ColorFormat::Rgba32F => image::ExtendedColorType::Rgba32F,
        }
    }
}

impl TryFrom<u8> for ColorFormat {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        ColorFormat::ALL
            .get(tag as usize)
            .copied()
            .ok_or(Error::UnsupportedFormat(tag))
    }
}

/// Look up the per-pixel byte depth of a wire tag.
///
/// Unknown tags are rejected rather than mapped to a default.
pub fn depth_of(tag: u8) -> Result<usize> {
    ColorFormat::try_from(tag).map(ColorFormat::depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_table() {
        let expected = [1, 2, 3, 4, 2, 4, 6, 8, 12, 16];
        for (format, depth) in ColorFormat::ALL.iter().zip(expected) {
            assert_eq!(format.depth(), depth, "{:?}", format);
        }
    }

    #[test]
    fn test_tags_round_trip_in_order() {
        for (i, format) in ColorFormat::ALL.iter().enumerate() {
            assert_eq!(format.tag() as usize, i);
            assert_eq!(ColorFormat::try_from(i as u8), Ok(*format));
        }
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        assert_eq!(ColorFormat::try_from(10), Err(Error::UnsupportedFormat(10)));
        assert_eq!(depth_of(255), Err(Error::UnsupportedFormat(255)));
    }

    #[test]
    fn test_depth_of_known_tag() {
        assert_eq!(depth_of(2), Ok(3));
        assert_eq!(depth_of(9), Ok(16));
    }

    #[test]
    fn test_depth_matches_image_crate() {
        for format in ColorFormat::ALL {
            let bits = format.to_image_color().bits_per_pixel() as usize;
            assert_eq!(bits / 8, format.depth(), "{:?}", format);
            assert_eq!(
                format.to_image_color().channel_count() as usize,
                format.channels()
            );
        }
    }

    #[test]
    fn test_default_is_rgb8() {
        assert_eq!(ColorFormat::default(), ColorFormat::Rgb8);
    }
}
