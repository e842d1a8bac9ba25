//! The native encoding engine.
//!
//! This is the callee side of the ABI: a C-compatible [`encode`] entry point
//! that reads a [`RawImageDescriptor`], writes PNG or JPEG bytes into the
//! output [`BufferView`] and returns the number of bytes used.
//!
//! # Contract
//!
//! - The raw view is only read. The output view is written up to `cap` and
//!   never beyond.
//! - A return value of 0 means failure. The reason is available from
//!   [`last_error`] on the same thread until the next call.
//! - A raw buffer shorter than `width * height * depth` is rejected. A longer
//!   one is accepted and only its leading `width * height * depth` bytes are
//!   encoded.
//! - Panics never cross the boundary; they are reported as failures.
//!
//! `pixbridge-ffi` exports these functions under their C names.

mod codec;
pub mod diag;

use crate::abi::{BufferView, RawImageDescriptor};
use crate::color::ColorFormat;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Signature of the engine's encode entry point.
pub type EncodeFn = unsafe extern "C" fn(*const RawImageDescriptor, *mut BufferView) -> u32;

/// Signature of the engine's diagnostic entry point.
pub type LastErrorFn = unsafe extern "C" fn(*mut BufferView) -> usize;

/// Reasons the engine refuses or fails an encode.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Null raw image descriptor pointer")]
    NullDescriptor,

    #[error("Null output descriptor pointer")]
    NullOutput,

    #[error("Null raw buffer pointer")]
    NullBuffer,

    #[error("Unsupported color format tag: {0}")]
    UnsupportedFormat(u8),

    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Image size overflows the address space")]
    SizeOverflow,

    #[error("Invalid pixel data: expected at least {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    #[error("Encoded image exceeds output capacity of {capacity} bytes")]
    CapacityExceeded { capacity: usize },

    #[error("Encoded length {0} does not fit the return type")]
    LengthOverflow(usize),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Engine panicked: {0}")]
    Panicked(String),
}

/// Encode a single image.
///
/// - `raw` describes the raw pixels and the requested output format.
/// - `out` is the region that receives the encoded image.
///
/// Returns the number of bytes used in `out` (its capacity may be larger), or
/// 0 on failure.
///
/// # Safety
///
/// `raw` and `out` must be null or point to valid descriptors. The regions they
/// describe must stay valid and unaliased until this function returns.
pub unsafe extern "C" fn encode(raw: *const RawImageDescriptor, out: *mut BufferView) -> u32 {
    diag::clear();
    // SAFETY: forwarded from the caller.
    let result = panic::catch_unwind(AssertUnwindSafe(|| unsafe { encode_descriptor(raw, out) }));
    let err = match result {
        Ok(Ok(len)) => return len,
        Ok(Err(err)) => err,
        Err(payload) => {
            let err = EngineError::Panicked(panic_message(payload.as_ref()));
            log::error!("{err}");
            err
        }
    };
    log::debug!("encode failed: {err}");
    diag::record(err.to_string());
    0
}

/// Copy the calling thread's last error message into `dst`.
///
/// At most `dst.cap` bytes of UTF-8 are written and `dst.len` is set to the
/// number copied. Returns the full length of the message, or 0 if there is
/// none. A null `dst` only queries the length.
///
/// # Safety
///
/// `dst` must be null or point to a view whose `ptr` is valid for `cap` bytes.
pub unsafe extern "C" fn last_error(dst: *mut BufferView) -> usize {
    let Some(message) = diag::message() else {
        return 0;
    };
    // SAFETY: forwarded from the caller.
    if let Some(dst) = unsafe { dst.as_mut() } {
        // SAFETY: forwarded from the caller.
        let buf = unsafe { dst.as_capacity_mut() };
        let n = message.len().min(buf.len());
        buf[..n].copy_from_slice(&message.as_bytes()[..n]);
        dst.len = n;
    }
    message.len()
}

unsafe fn encode_descriptor(
    raw: *const RawImageDescriptor,
    out: *mut BufferView,
) -> Result<u32, EngineError> {
    // SAFETY: the caller guarantees the pointers are null or valid.
    let raw = unsafe { raw.as_ref() }.ok_or(EngineError::NullDescriptor)?;
    let out = unsafe { out.as_mut() }.ok_or(EngineError::NullOutput)?;

    let format = ColorFormat::try_from(raw.color_type)
        .map_err(|_| EngineError::UnsupportedFormat(raw.color_type))?;
    if raw.width == 0 || raw.height == 0 {
        return Err(EngineError::InvalidDimensions {
            width: raw.width,
            height: raw.height,
        });
    }
    let expected = (raw.width as usize)
        .checked_mul(raw.height as usize)
        .and_then(|px| px.checked_mul(format.depth()))
        .ok_or(EngineError::SizeOverflow)?;
    if raw.buffer.len < expected {
        return Err(EngineError::InvalidPixelData {
            expected,
            actual: raw.buffer.len,
        });
    }
    if raw.buffer.ptr.is_null() {
        return Err(EngineError::NullBuffer);
    }
    if raw.buffer.len > expected {
        log::debug!(
            "raw buffer holds {} bytes, encoding the leading {expected}",
            raw.buffer.len
        );
    }

    // SAFETY: the raw view is valid for `len` bytes, which is at least `expected`.
    let pixels = &unsafe { raw.buffer.as_slice() }[..expected];
    // SAFETY: the output view is valid and unaliased for `cap` bytes.
    let output = unsafe { out.as_capacity_mut() };

    let written = codec::encode_into(
        pixels,
        raw.width,
        raw.height,
        format,
        raw.png,
        raw.quality,
        output,
    )?;
    u32::try_from(written).map_err(|_| EngineError::LengthOverflow(written))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    fn descriptor(
        raw: &[u8],
        width: u32,
        height: u32,
        png: bool,
        color_type: u8,
    ) -> RawImageDescriptor {
        RawImageDescriptor {
            buffer: BufferView::from_slice(raw),
            width,
            height,
            png,
            quality: 75,
            color_type,
        }
    }

    fn last_message() -> String {
        let mut storage = vec![0u8; 256];
        let mut view = BufferView::from_mut_slice(&mut storage);
        let full = unsafe { last_error(&mut view) };
        assert_eq!(full, view.len);
        String::from_utf8(storage[..view.len].to_vec()).unwrap()
    }

    #[test]
    fn test_encode_png() {
        let raw = vec![10u8; 16 * 16 * 4];
        let mut out = vec![0u8; raw.len()];
        let desc = descriptor(&raw, 16, 16, true, ColorFormat::Rgba8.tag());
        let mut view = BufferView::from_mut_slice(&mut out);

        let len = unsafe { encode(&desc, &mut view) } as usize;
        assert!(len > 0 && len <= out.len());
        assert_eq!(&out[1..4], b"PNG");
        assert_eq!(unsafe { last_error(ptr::null_mut()) }, 0);
    }

    #[test]
    fn test_null_descriptors() {
        let mut out = vec![0u8; 8];
        let mut view = BufferView::from_mut_slice(&mut out);
        assert_eq!(unsafe { encode(ptr::null(), &mut view) }, 0);
        assert_eq!(last_message(), "Null raw image descriptor pointer");

        let raw = vec![0u8; 4];
        let desc = descriptor(&raw, 2, 2, true, 0);
        assert_eq!(unsafe { encode(&desc, ptr::null_mut()) }, 0);
        assert_eq!(last_message(), "Null output descriptor pointer");
    }

    #[test]
    fn test_unknown_color_tag() {
        let raw = vec![0u8; 16];
        let mut out = vec![0u8; 16];
        let desc = descriptor(&raw, 4, 4, true, 42);
        let mut view = BufferView::from_mut_slice(&mut out);
        assert_eq!(unsafe { encode(&desc, &mut view) }, 0);
        assert!(last_message().contains("42"));
    }

    #[test]
    fn test_zero_dimensions() {
        let raw: Vec<u8> = Vec::new();
        let mut out = vec![0u8; 16];
        let desc = descriptor(&raw, 0, 4, true, 0);
        let mut view = BufferView::from_mut_slice(&mut out);
        assert_eq!(unsafe { encode(&desc, &mut view) }, 0);
        assert!(last_message().starts_with("Invalid dimensions"));
    }

    #[test]
    fn test_short_raw_buffer_is_rejected() {
        let raw = vec![0u8; 100];
        let mut out = vec![0u8; 256 * 256 * 3];
        let desc = descriptor(&raw, 256, 256, true, ColorFormat::Rgb8.tag());
        let mut view = BufferView::from_mut_slice(&mut out);
        assert_eq!(unsafe { encode(&desc, &mut view) }, 0);
        assert_eq!(
            last_message(),
            "Invalid pixel data: expected at least 196608 bytes, got 100"
        );
    }

    #[test]
    fn test_long_raw_buffer_encodes_prefix() {
        let raw = vec![50u8; 64 * 64 * 3];
        let mut out = vec![0u8; raw.len()];
        let desc = descriptor(&raw, 32, 32, true, ColorFormat::Rgb8.tag());
        let mut view = BufferView::from_mut_slice(&mut out);
        let len = unsafe { encode(&desc, &mut view) } as usize;
        assert!(len > 0);

        let decoded = image::load_from_memory(&out[..len]).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
    }

    #[test]
    fn test_capacity_exceeded_leaves_tail_untouched() {
        let raw = vec![0u8; 1];
        let mut out = vec![0xAAu8; 8];
        let desc = descriptor(&raw, 1, 1, true, ColorFormat::L8.tag());
        let mut view = BufferView::from_mut_slice(&mut out[..4]);
        assert_eq!(unsafe { encode(&desc, &mut view) }, 0);
        assert!(last_message().contains("capacity of 4"));
        assert_eq!(&out[4..], &[0xAA; 4]);
    }

    #[test]
    fn test_last_error_truncates_to_capacity() {
        diag::record("a long diagnostic");
        let mut storage = [0u8; 6];
        let mut view = BufferView::from_mut_slice(&mut storage);
        let full = unsafe { last_error(&mut view) };
        assert_eq!(full, "a long diagnostic".len());
        assert_eq!(view.len, 6);
        assert_eq!(&storage, b"a long");
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u32), "unknown panic");
    }
}
