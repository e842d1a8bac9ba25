//! Pixbridge FFI - C ABI exports for managed hosts
//!
//! This crate exposes pixbridge-core across a C ABI so a host runtime (for
//! example a .NET or game-engine process) can encode images without copying
//! pixels through its own heap.
//!
//! # Module Structure
//!
//! - `engine` - The engine entry points: `encode` and `pixbridge_last_error`
//! - `handle` - Opaque [`ImageBuffer`](pixbridge_core::ImageBuffer) handles
//! - `status` - C-compatible status codes
//! - `headers` - C header generation (feature `headers`)
//!
//! # Usage
//!
//! A host that keeps its own pixel arrays calls `encode` directly with
//! descriptors over pinned memory. A host that prefers Rust-owned memory
//! creates a handle, writes pixels through `pixbridge_buffer_raw`, then calls
//! `pixbridge_buffer_encode` and `pixbridge_buffer_extract`.
//!
//! The C declarations come from the generated header. Build it with
//! `cargo run -p pixbridge-ffi --features headers --bin generate-headers`,
//! which writes `include/pixbridge.h`.
//!
//! ```c
//! #include "pixbridge.h"
//!
//! PixbridgeImageBuffer *buf = NULL;
//! pixbridge_buffer_new(256, 256, 2 /* Rgb8 */, &buf);
//! BufferView raw = pixbridge_buffer_raw(buf);
//! memcpy(raw.ptr, pixels, raw.len);
//! uint32_t len = 0;
//! if (pixbridge_buffer_encode(buf, true, 75, &len) == PIXBRIDGE_STATUS_OK) { ... }
//! pixbridge_buffer_free(buf);
//! ```

mod engine;
mod handle;
#[cfg(feature = "headers")]
pub mod headers;
mod status;

pub use engine::{encode, pixbridge_last_error};
pub use handle::{
    pixbridge_buffer_encode, pixbridge_buffer_extract, pixbridge_buffer_free, pixbridge_buffer_new,
    pixbridge_buffer_raw, PixbridgeImageBuffer,
};
pub use pixbridge_core::abi::{BufferView, RawImageDescriptor};
pub use status::PixbridgeStatus;

/// Get the version of the library
#[no_mangle]
pub extern "C" fn pixbridge_version() -> *const std::ffi::c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr().cast()
}
