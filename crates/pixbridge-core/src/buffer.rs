//! Image buffers: one image's raw pixels plus a reusable output region.
//!
//! An [`ImageBuffer`] owns two byte regions. The raw region holds row-major
//! pixels in its [`ColorFormat`]. The encoded region is allocated once, at
//! least as large as the raw region, and receives the engine's output on each
//! [`encode`](ImageBuffer::encode). Only the prefix reported by the last
//! encode is meaningful; the rest is stale.
//!
//! # Threading
//!
//! Different buffers share nothing and can be encoded in parallel. Encoding
//! takes `&mut self`, so two encodes on the same buffer cannot overlap.

use crate::color::ColorFormat;
use crate::error::{Error, Result};
use crate::protocol::{self, EncodeRequest, Engine, NativeEngine};
use serde::{Deserialize, Serialize};

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetFormat {
    #[default]
    Png,
    Jpeg,
}

impl TargetFormat {
    pub fn is_png(self) -> bool {
        matches!(self, TargetFormat::Png)
    }
}

/// Per-call encode settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeOptions {
    /// Output container.
    pub target: TargetFormat,
    /// JPEG quality (0-100). Ignored for PNG.
    pub quality: u8,
}

impl EncodeOptions {
    /// Default JPEG quality.
    pub const DEFAULT_QUALITY: u8 = 75;

    /// Create options, clamping `quality` to 100.
    pub fn new(target: TargetFormat, quality: u8) -> Self {
        Self {
            target,
            quality: quality.min(100),
        }
    }

    pub fn png() -> Self {
        Self::new(TargetFormat::Png, Self::DEFAULT_QUALITY)
    }

    pub fn jpeg(quality: u8) -> Self {
        Self::new(TargetFormat::Jpeg, quality)
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::png()
    }
}

/// Working memory for one image.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    color_format: ColorFormat,
    raw: Vec<u8>,
    encoded: Vec<u8>,
}

impl ImageBuffer {
    /// Allocate zeroed regions of `width * height * depth` bytes each.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationError`] if the size overflows or the
    /// allocation fails.
    pub fn new(width: u32, height: u32, color_format: ColorFormat) -> Result<Self> {
        let len = checked_len(width, height, color_format)?;
        let raw = zeroed(len, width, height, color_format)?;
        let encoded = zeroed(len, width, height, color_format)?;
        log::debug!(
            "allocated {width}x{height} {color_format:?} image buffer ({len} bytes per region)"
        );
        Ok(Self {
            width,
            height,
            color_format,
            raw,
            encoded,
        })
    }

    /// Adopt `raw` as the raw region without copying it.
    ///
    /// The encoded region is allocated to `raw.len()`.
    ///
    /// # Preconditions
    ///
    /// `raw.len()` should equal `width * height * depth`. This is not enforced
    /// here. At encode time a shorter buffer fails with
    /// [`Error::EncodingFailed`], and a longer one encodes the declared
    /// geometry from its leading bytes. Neither reads out of bounds.
    pub fn from_raw(
        raw: Vec<u8>,
        width: u32,
        height: u32,
        color_format: ColorFormat,
    ) -> Result<Self> {
        let encoded = zeroed(raw.len(), width, height, color_format)?;
        let buffer = Self {
            width,
            height,
            color_format,
            raw,
            encoded,
        };
        if !buffer.is_consistent() {
            log::warn!(
                "raw buffer of {} bytes does not match {}x{} {:?} ({:?} bytes expected)",
                buffer.raw.len(),
                width,
                height,
                color_format,
                buffer.expected_raw_len()
            );
        }
        Ok(buffer)
    }

    /// Grow the encoded region to at least `capacity` bytes.
    ///
    /// Small images can compress to more bytes than their raw size (format
    /// headers alone exceed a few pixels). Call this right after construction
    /// to reserve room for them. The region never shrinks below the raw size.
    pub fn with_encoded_capacity(mut self, capacity: usize) -> Result<Self> {
        if capacity > self.encoded.len() {
            let extra = capacity - self.encoded.len();
            self.encoded
                .try_reserve_exact(extra)
                .map_err(|e| alloc_error(self.width, self.height, self.color_format, e))?;
            self.encoded.resize(capacity, 0);
        }
        Ok(self)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn color_format(&self) -> ColorFormat {
        self.color_format
    }

    /// Raw pixel bytes.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Raw pixel bytes, for filling in place.
    pub fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.raw
    }

    pub fn raw_len(&self) -> usize {
        self.raw.len()
    }

    /// Size of the encoded region, the upper bound of any encode result.
    pub fn encoded_capacity(&self) -> usize {
        self.encoded.len()
    }

    /// `width * height * depth`, or `None` if it overflows.
    pub fn expected_raw_len(&self) -> Option<usize> {
        checked_len(self.width, self.height, self.color_format).ok()
    }

    /// Whether the raw length matches the declared geometry.
    pub fn is_consistent(&self) -> bool {
        self.expected_raw_len() == Some(self.raw.len())
    }

    /// Give back the raw region.
    pub fn into_raw(self) -> Vec<u8> {
        self.raw
    }

    /// Encode with the built-in engine. Returns the number of valid bytes at
    /// the start of the encoded region.
    pub fn encode(&mut self, options: EncodeOptions) -> Result<usize> {
        self.encode_with(&NativeEngine::builtin(), options)
    }

    /// Encode with a specific engine.
    pub fn encode_with<E: Engine + ?Sized>(
        &mut self,
        engine: &E,
        options: EncodeOptions,
    ) -> Result<usize> {
        let request = EncodeRequest {
            raw: &self.raw,
            width: self.width,
            height: self.height,
            color_format: self.color_format,
            options,
        };
        let len = protocol::run(engine, request, &mut self.encoded)?;
        log::debug!(
            "encoded {}x{} {:?} as {:?}: {} of {} bytes",
            self.width,
            self.height,
            self.color_format,
            options.target,
            len,
            self.encoded.len()
        );
        Ok(len)
    }

    /// Copy the first `length` bytes of the encoded region.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `length` exceeds the region.
    pub fn extract_encoded(&self, length: usize) -> Result<Vec<u8>> {
        self.encoded
            .get(..length)
            .map(<[u8]>::to_vec)
            .ok_or(Error::OutOfRange {
                requested: length,
                capacity: self.encoded.len(),
            })
    }

    /// Copy the first `length` bytes of the encoded region into `dst`,
    /// returning `length`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `length` exceeds the region or `dst`.
    pub fn extract_encoded_into(&self, length: usize, dst: &mut [u8]) -> Result<usize> {
        let src = self.encoded.get(..length).ok_or(Error::OutOfRange {
            requested: length,
            capacity: self.encoded.len(),
        })?;
        let capacity = dst.len();
        let dst = dst.get_mut(..length).ok_or(Error::OutOfRange {
            requested: length,
            capacity,
        })?;
        dst.copy_from_slice(src);
        Ok(length)
    }

    /// Encode and copy out the result.
    pub fn encode_to_vec(&mut self, options: EncodeOptions) -> Result<Vec<u8>> {
        let len = self.encode(options)?;
        self.extract_encoded(len)
    }
}

fn checked_len(width: u32, height: u32, color_format: ColorFormat) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(color_format.depth()))
        .ok_or_else(|| Error::AllocationError {
            width,
            height,
            depth: color_format.depth(),
            reason: "size overflows usize".to_string(),
        })
}

fn zeroed(len: usize, width: u32, height: u32, color_format: ColorFormat) -> Result<Vec<u8>> {
    let mut region = Vec::new();
    region
        .try_reserve_exact(len)
        .map_err(|e| alloc_error(width, height, color_format, e))?;
    region.resize(len, 0);
    Ok(region)
}

fn alloc_error(
    width: u32,
    height: u32,
    color_format: ColorFormat,
    err: std::collections::TryReserveError,
) -> Error {
    Error::AllocationError {
        width,
        height,
        depth: color_format.depth(),
        reason: err.to_string(),
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
