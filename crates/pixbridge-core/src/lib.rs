//! Pixbridge Core - zero-copy image buffers for a native PNG/JPEG engine
//!
//! This crate provides the buffer contract used to hand raw pixels to an
//! encoding engine across a C ABI and read back the encoded bytes, including
//! the engine itself.
//!
//! # Module Structure
//!
//! - `color` - Color formats and their byte depth
//! - `abi` - Fixed-layout descriptors shared with the engine
//! - `buffer` - [`ImageBuffer`], the owner of one image's memory
//! - `protocol` - The encode call: pinning, dispatch and result checks
//! - `engine` - The C-ABI encoder backed by the `image` crate
//! - `batch` - Parallel encoding (feature `rayon`)

pub mod abi;
#[cfg(feature = "rayon")]
pub mod batch;
pub mod buffer;
pub mod color;
pub mod engine;
pub mod error;
pub mod protocol;

pub use abi::{BufferView, RawImageDescriptor};
pub use buffer::{EncodeOptions, ImageBuffer, TargetFormat};
pub use color::{depth_of, ColorFormat};
pub use error::{Error, Result};
pub use protocol::{CallPhase, EncodeRequest, Engine, NativeEngine};
