//! The synchronous encode call.
//!
//! One call moves through `Idle -> Pinned -> Dispatched -> Completed | Faulted
//! -> Idle`. Pinning is a scoped borrow of both regions held by [`PinGuard`];
//! the guard is released when it goes out of scope, on success, on error and
//! while unwinding. The engine call blocks the current thread until it
//! returns. There is no cancellation point and no timeout.

use crate::abi::{BufferView, Descriptors, RawImageDescriptor};
use crate::buffer::EncodeOptions;
use crate::color::ColorFormat;
use crate::engine::{self, EncodeFn, LastErrorFn};
use crate::error::{Error, Result};

/// A native encoder reachable through the descriptor ABI.
pub trait Engine: Sync {
    /// Encode the described image into `out`, returning the bytes used or 0
    /// on failure.
    ///
    /// # Safety
    ///
    /// Both descriptors must be valid, and the regions they describe must
    /// stay valid and unaliased for the duration of the call.
    unsafe fn encode(&self, raw: *const RawImageDescriptor, out: *mut BufferView) -> u32;

    /// Diagnostic for the most recent failure on this thread.
    fn last_error(&self) -> Option<String>;
}

/// An engine made of C function pointers.
#[derive(Debug, Clone, Copy)]
pub struct NativeEngine {
    encode: EncodeFn,
    last_error: Option<LastErrorFn>,
}

impl NativeEngine {
    /// Wrap an engine's exported functions.
    ///
    /// # Safety
    ///
    /// `encode` and `last_error` must honor the engine contract documented in
    /// [`crate::engine`]: never write past the output capacity and never read
    /// past the raw length.
    pub unsafe fn from_fns(encode: EncodeFn, last_error: Option<LastErrorFn>) -> Self {
        Self { encode, last_error }
    }

    /// The engine compiled into this crate.
    pub fn builtin() -> Self {
        Self {
            encode: engine::encode,
            last_error: Some(engine::last_error),
        }
    }
}

impl Default for NativeEngine {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Engine for NativeEngine {
    unsafe fn encode(&self, raw: *const RawImageDescriptor, out: *mut BufferView) -> u32 {
        // SAFETY: forwarded from the caller.
        unsafe { (self.encode)(raw, out) }
    }

    fn last_error(&self) -> Option<String> {
        let last_error = self.last_error?;
        // SAFETY: a null view only queries the length.
        let len = unsafe { last_error(std::ptr::null_mut()) };
        if len == 0 {
            return None;
        }
        let mut storage = vec![0u8; len];
        let mut view = BufferView::from_mut_slice(&mut storage);
        // SAFETY: the view describes `storage`, which outlives the call.
        unsafe { last_error(&mut view) };
        storage.truncate(view.len.min(len));
        Some(String::from_utf8_lossy(&storage).into_owned())
    }
}

/// Phase of an encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Idle,
    Pinned,
    Dispatched,
    Completed,
    Faulted,
}

/// A borrowed view of one image, valid for a single call.
#[derive(Debug, Clone, Copy)]
pub struct EncodeRequest<'a> {
    pub raw: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub color_format: ColorFormat,
    pub options: EncodeOptions,
}

/// Exclusive, address-stable hold on both regions for one call.
///
/// Heap storage behind a borrowed `Vec` cannot move or be aliased while the
/// borrow lives, so the borrow itself is the pin.
pub(crate) struct PinGuard<'a> {
    request: EncodeRequest<'a>,
    encoded: &'a mut [u8],
    phase: CallPhase,
}

impl<'a> PinGuard<'a> {
    pub(crate) fn pin(request: EncodeRequest<'a>, encoded: &'a mut [u8]) -> Self {
        log::trace!(
            "pinned {} raw bytes and {} output bytes",
            request.raw.len(),
            encoded.len()
        );
        Self {
            request,
            encoded,
            phase: CallPhase::Pinned,
        }
    }

    pub(crate) fn phase(&self) -> CallPhase {
        self.phase
    }

    /// Build descriptors, call the engine and check the returned length.
    pub(crate) fn dispatch<E: Engine + ?Sized>(&mut self, engine: &E) -> Result<usize> {
        let capacity = self.encoded.len();
        let request = self.request;
        let mut descriptors = Descriptors::new(
            request.raw,
            request.width,
            request.height,
            request.options.target.is_png(),
            request.options.quality,
            request.color_format.tag(),
            &mut *self.encoded,
        );
        let (raw, out) = descriptors.as_ptrs();

        self.phase = CallPhase::Dispatched;
        // SAFETY: the descriptors point into regions borrowed by this guard and
        // are dropped before it.
        let returned = unsafe { engine.encode(raw, out) } as usize;
        drop(descriptors);

        match interpret(returned, capacity, || engine.last_error()) {
            Ok(len) => {
                self.phase = CallPhase::Completed;
                Ok(len)
            }
            Err(err) => {
                self.phase = CallPhase::Faulted;
                Err(err)
            }
        }
    }
}

impl Drop for PinGuard<'_> {
    fn drop(&mut self) {
        log::trace!("released pin after {:?}", self.phase);
        self.phase = CallPhase::Idle;
    }
}

/// Turn the engine's return value into a length or an error.
///
/// Lengths past the capacity are never clamped. A zero length is always a
/// failure because the engine never produces an empty image.
fn interpret(
    returned: usize,
    capacity: usize,
    diagnostic: impl FnOnce() -> Option<String>,
) -> Result<usize> {
    if returned > capacity {
        return Err(Error::EngineContractViolation { returned, capacity });
    }
    if returned == 0 {
        let detail = diagnostic().unwrap_or_else(|| "engine returned no data".to_string());
        return Err(Error::EncodingFailed(detail));
    }
    Ok(returned)
}

/// Run one complete encode call.
pub(crate) fn run<E: Engine + ?Sized>(
    engine: &E,
    request: EncodeRequest<'_>,
    encoded: &mut [u8],
) -> Result<usize> {
    let mut guard = PinGuard::pin(request, encoded);
    let result = guard.dispatch(engine);
    debug_assert!(matches!(
        guard.phase(),
        CallPhase::Completed | CallPhase::Faulted
    ));
    result
}
