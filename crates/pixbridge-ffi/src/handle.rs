//! Opaque image-buffer handles.
//!
//! The host owns a handle from `pixbridge_buffer_new` until it passes it to
//! `pixbridge_buffer_free`. A handle must not be used from two threads at
//! once; distinct handles are independent. Failures set the thread's last
//! error, readable with `pixbridge_last_error`.

use crate::status::PixbridgeStatus;
use pixbridge_core::abi::BufferView;
use pixbridge_core::engine::diag;
use pixbridge_core::{ColorFormat, EncodeOptions, Error, ImageBuffer, TargetFormat};
use std::ptr;

/// An image buffer owned by the host through a pointer.
///
/// Not `#[repr(C)]`, so the generated header only forward-declares it.
pub struct PixbridgeImageBuffer(ImageBuffer);

fn fail(error: &Error) -> PixbridgeStatus {
    log::debug!("handle call failed: {error}");
    diag::record(error.to_string());
    PixbridgeStatus::from(error)
}

fn null_pointer(name: &str) -> PixbridgeStatus {
    diag::record(format!("Null pointer provided for {name}"));
    PixbridgeStatus::NullPointer
}

/// Allocate an image buffer of `width * height * depth` bytes.
///
/// On success `*out` receives the handle. On failure it is set to null.
///
/// # Safety
///
/// `out` must be null or valid for a pointer write.
#[no_mangle]
pub unsafe extern "C" fn pixbridge_buffer_new(
    width: u32,
    height: u32,
    color_type: u8,
    out: *mut *mut PixbridgeImageBuffer,
) -> PixbridgeStatus {
    // SAFETY: the caller guarantees `out` is null or writable.
    let Some(out) = (unsafe { out.as_mut() }) else {
        return null_pointer("out");
    };
    *out = ptr::null_mut();
    diag::clear();

    match ColorFormat::try_from(color_type).and_then(|f| ImageBuffer::new(width, height, f)) {
        Ok(buffer) => {
            *out = Box::into_raw(Box::new(PixbridgeImageBuffer(buffer)));
            PixbridgeStatus::Ok
        }
        Err(e) => fail(&e),
    }
}

/// Describe the handle's raw region so the host can write pixels into it.
///
/// The view stays valid until the handle is freed. Returns an empty view for a
/// null handle.
///
/// # Safety
///
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn pixbridge_buffer_raw(handle: *mut PixbridgeImageBuffer) -> BufferView {
    // SAFETY: the caller guarantees `handle` is null or live.
    match unsafe { handle.as_mut() } {
        Some(handle) => BufferView::from_mut_slice(handle.0.raw_mut()),
        None => BufferView::empty(),
    }
}

/// Encode the handle's raw region. `*out_len` receives the encoded length.
///
/// # Safety
///
/// `handle` must be null or a live handle not in use on another thread.
/// `out_len` must be null or valid for a write.
#[no_mangle]
pub unsafe extern "C" fn pixbridge_buffer_encode(
    handle: *mut PixbridgeImageBuffer,
    png: bool,
    quality: u8,
    out_len: *mut u32,
) -> PixbridgeStatus {
    // SAFETY: the caller guarantees both pointers are null or valid.
    let Some(handle) = (unsafe { handle.as_mut() }) else {
        return null_pointer("handle");
    };
    let Some(out_len) = (unsafe { out_len.as_mut() }) else {
        return null_pointer("out_len");
    };
    *out_len = 0;

    let target = if png {
        TargetFormat::Png
    } else {
        TargetFormat::Jpeg
    };
    match handle.0.encode(EncodeOptions::new(target, quality)) {
        Ok(len) => {
            // The engine reports lengths as u32, so this never truncates.
            *out_len = len as u32;
            PixbridgeStatus::Ok
        }
        Err(e) => fail(&e),
    }
}

/// Copy the first `length` encoded bytes into `dst` and set `dst.len`.
///
/// Fails with `OutOfRange` if `length` exceeds the encoded region or
/// `dst.cap`.
///
/// # Safety
///
/// `handle` must be null or a live handle. `dst` must be null or describe a
/// writable region of `cap` bytes that does not overlap the handle's memory.
#[no_mangle]
pub unsafe extern "C" fn pixbridge_buffer_extract(
    handle: *const PixbridgeImageBuffer,
    length: usize,
    dst: *mut BufferView,
) -> PixbridgeStatus {
    // SAFETY: the caller guarantees both pointers are null or valid.
    let Some(handle) = (unsafe { handle.as_ref() }) else {
        return null_pointer("handle");
    };
    let Some(dst) = (unsafe { dst.as_mut() }) else {
        return null_pointer("dst");
    };

    // SAFETY: `dst` describes a writable, non-overlapping region.
    let target = unsafe { dst.as_capacity_mut() };
    match handle.0.extract_encoded_into(length, target) {
        Ok(copied) => {
            dst.len = copied;
            PixbridgeStatus::Ok
        }
        Err(e) => fail(&e),
    }
}

/// Release a handle. Null is ignored.
///
/// # Safety
///
/// `handle` must be null or a live handle, and must not be used afterward.
#[no_mangle]
pub unsafe extern "C" fn pixbridge_buffer_free(handle: *mut PixbridgeImageBuffer) {
    if !handle.is_null() {
        // SAFETY: the handle came from `Box::into_raw` in `pixbridge_buffer_new`.
        drop(unsafe { Box::from_raw(handle) });
    }
}
