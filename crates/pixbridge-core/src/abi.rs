//! Fixed-layout descriptors passed to the native engine.
//!
//! These structs are the only thing that crosses the boundary. Field order and
//! widths are part of the ABI:
//!
//! | struct               | field        | offset | size |
//! |----------------------|--------------|--------|------|
//! | `BufferView`         | `ptr`        | 0      | 8    |
//! |                      | `len`        | 8      | 8    |
//! |                      | `cap`        | 16     | 8    |
//! | `RawImageDescriptor` | `buffer`     | 0      | 24   |
//! |                      | `width`      | 24     | 4    |
//! |                      | `height`     | 28     | 4    |
//! |                      | `png`        | 32     | 1    |
//! |                      | `quality`    | 33     | 1    |
//! |                      | `color_type` | 34     | 1    |
//!
//! `RawImageDescriptor` is padded to 40 bytes. Offsets are for 64-bit targets.
//!
//! A descriptor does not own the memory it points at. It is built fresh for a
//! single call and is only valid while the described regions are borrowed.

use std::marker::PhantomData;
use std::ptr;

/// A contiguous byte region: start address, length and capacity.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct BufferView {
    pub ptr: *mut u8,
    pub len: usize,
    pub cap: usize,
}

impl BufferView {
    /// A view that points at nothing.
    pub const fn empty() -> Self {
        Self {
            ptr: ptr::null_mut(),
            len: 0,
            cap: 0,
        }
    }

    /// Describe a read-only region. The engine must never write through it.
    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            ptr: data.as_ptr() as *mut u8,
            len: data.len(),
            cap: data.len(),
        }
    }

    /// Describe a writable region of `data.len()` bytes.
    pub fn from_mut_slice(data: &mut [u8]) -> Self {
        Self {
            ptr: data.as_mut_ptr(),
            len: data.len(),
            cap: data.len(),
        }
    }

    /// Borrow the first `len` bytes.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `len` bytes for `'a`, or `len` must be 0.
    pub unsafe fn as_slice<'a>(&self) -> &'a [u8] {
        if self.ptr.is_null() || self.len == 0 {
            return &[];
        }
        // SAFETY: guaranteed by the caller.
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }

    /// Borrow the full capacity for writing.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes of `cap` bytes for `'a` and not aliased,
    /// or `cap` must be 0.
    pub unsafe fn as_capacity_mut<'a>(&mut self) -> &'a mut [u8] {
        if self.ptr.is_null() || self.cap == 0 {
            return &mut [];
        }
        // SAFETY: guaranteed by the caller.
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.cap) }
    }
}

/// The raw image and its metadata.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawImageDescriptor {
    /// The raw pixel data.
    pub buffer: BufferView,
    /// The width of the image.
    pub width: u32,
    /// The height of the image.
    pub height: u32,
    /// If true, encode to PNG. If false, encode to JPEG.
    pub png: bool,
    /// JPEG quality (0-100). Ignored for PNG.
    pub quality: u8,
    /// The color format tag, see [`ColorFormat`](crate::ColorFormat).
    pub color_type: u8,
}

#[cfg(target_pointer_width = "64")]
const _: () = {
    assert!(std::mem::size_of::<BufferView>() == 24);
    assert!(std::mem::size_of::<RawImageDescriptor>() == 40);
};

/// A descriptor pair tied to the borrows it was built from.
///
/// The raw-pointer descriptors themselves are `Copy` and carry no lifetime;
/// this wrapper keeps them from escaping the call that pinned the regions.
pub struct Descriptors<'a> {
    raw: RawImageDescriptor,
    out: BufferView,
    _marker: PhantomData<(&'a [u8], &'a mut [u8])>,
}

impl<'a> Descriptors<'a> {
    pub(crate) fn new(
        raw: &'a [u8],
        width: u32,
        height: u32,
        png: bool,
        quality: u8,
        color_type: u8,
        out: &'a mut [u8],
    ) -> Self {
        Self {
            raw: RawImageDescriptor {
                buffer: BufferView::from_slice(raw),
                width,
                height,
                png,
                quality,
                color_type,
            },
            out: BufferView::from_mut_slice(out),
            _marker: PhantomData,
        }
    }

    pub fn raw(&self) -> &RawImageDescriptor {
        &self.raw
    }

    /// Capacity of the output region.
    pub fn capacity(&self) -> usize {
        self.out.cap
    }

    pub(crate) fn as_ptrs(&mut self) -> (*const RawImageDescriptor, *mut BufferView) {
        (
            &self.raw as *const RawImageDescriptor,
            &mut self.out as *mut BufferView,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, offset_of, size_of};

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_buffer_view_layout() {
        assert_eq!(size_of::<BufferView>(), 24);
        assert_eq!(align_of::<BufferView>(), 8);
        assert_eq!(offset_of!(BufferView, ptr), 0);
        assert_eq!(offset_of!(BufferView, len), 8);
        assert_eq!(offset_of!(BufferView, cap), 16);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_raw_image_descriptor_layout() {
        assert_eq!(size_of::<RawImageDescriptor>(), 40);
        assert_eq!(offset_of!(RawImageDescriptor, buffer), 0);
        assert_eq!(offset_of!(RawImageDescriptor, width), 24);
        assert_eq!(offset_of!(RawImageDescriptor, height), 28);
        assert_eq!(offset_of!(RawImageDescriptor, png), 32);
        assert_eq!(offset_of!(RawImageDescriptor, quality), 33);
        assert_eq!(offset_of!(RawImageDescriptor, color_type), 34);
    }

    #[test]
    fn test_views_describe_the_slices() {
        let raw = vec![1u8, 2, 3, 4];
        let mut out = vec![0u8; 8];
        let mut desc = Descriptors::new(&raw, 2, 2, true, 75, 0, &mut out);

        assert_eq!(desc.raw().buffer.ptr as *const u8, raw.as_ptr());
        assert_eq!(desc.raw().buffer.len, 4);
        assert_eq!(desc.raw().buffer.cap, 4);
        assert_eq!(desc.capacity(), 8);

        let (raw_ptr, out_ptr) = desc.as_ptrs();
        unsafe {
            assert_eq!((*raw_ptr).width, 2);
            assert_eq!((*out_ptr).len, 8);
        }
    }

    #[test]
    fn test_empty_view_yields_empty_slices() {
        let mut view = BufferView::empty();
        unsafe {
            assert!(view.as_slice().is_empty());
            assert!(view.as_capacity_mut().is_empty());
        }
    }
}
