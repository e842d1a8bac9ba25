//! Unmangled engine entry points.

use pixbridge_core::abi::{BufferView, RawImageDescriptor};
use pixbridge_core::engine;

/// Encode a single image.
///
/// - `raw_image` The raw image and its metadata.
/// - `encoded_image` The region that receives the encoded image.
///
/// Returns the number of bytes used in `encoded_image` (its capacity may be
/// larger), or 0 on failure. Call [`pixbridge_last_error`] for the reason.
///
/// # Safety
///
/// Both pointers must be null or point to valid descriptors whose regions stay
/// valid, pinned and unaliased until the call returns.
#[no_mangle]
pub unsafe extern "C" fn encode(
    raw_image: *const RawImageDescriptor,
    encoded_image: *mut BufferView,
) -> u32 {
    // SAFETY: forwarded from the caller.
    unsafe { engine::encode(raw_image, encoded_image) }
}

/// Copy the calling thread's last error message into `dst`.
///
/// Returns the full message length; `dst.len` receives the number of bytes
/// copied. Pass null to query the length only.
///
/// # Safety
///
/// `dst` must be null or describe a writable region of `cap` bytes.
#[no_mangle]
pub unsafe extern "C" fn pixbridge_last_error(dst: *mut BufferView) -> usize {
    // SAFETY: forwarded from the caller.
    unsafe { engine::last_error(dst) }
}
