//! Heap buffers handed across the boundary.
//!
//! Buffers are allocated with the C allocator so the host can release them
//! through `vmbridge_free`, the single release path.

use libc::c_void;
use std::ptr::NonNull;

/// Move-only owner of one C-allocated buffer.
#[derive(Debug)]
pub struct OwnedBuffer {
    ptr: NonNull<c_void>,
    len: usize,
}

impl OwnedBuffer {
    /// Copies `bytes` plus a trailing NUL into a fresh C allocation.
    ///
    /// Returns `None` when the allocator fails.
    pub fn copy_c_string(bytes: &[u8]) -> Option<Self> {
        let len = bytes.len();
        // SAFETY: malloc with a non-zero size; the result is checked below.
        let raw = unsafe { libc::malloc(len + 1) };
        let ptr = NonNull::new(raw)?;
        // SAFETY: the allocation holds `len + 1` bytes and does not overlap `bytes`.
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.as_ptr().cast::<u8>(), len);
            *ptr.as_ptr().cast::<u8>().add(len) = 0;
        }
        Some(Self { ptr, len })
    }

    /// Takes ownership of a buffer returned across the boundary earlier.
    ///
    /// # Safety
    /// `raw` must come from the C allocator and must not be owned elsewhere.
    pub unsafe fn from_raw(raw: *mut c_void) -> Option<Self> {
        NonNull::new(raw).map(|ptr| Self { ptr, len: 0 })
    }

    /// Content length in bytes, excluding the trailing NUL; `0` when the
    /// buffer was adopted through [`from_raw`](Self::from_raw).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *const c_void {
        self.ptr.as_ptr()
    }

    /// Hands ownership to the host.
    pub fn into_raw(self) -> *mut c_void {
        let raw = self.ptr.as_ptr();
        std::mem::forget(self);
        raw
    }
}

impl Drop for OwnedBuffer {
    fn drop(&mut self) {
        // SAFETY: `ptr` came from the C allocator and is owned by `self`.
        unsafe { libc::free(self.ptr.as_ptr()) };
    }
}

#[cfg(test)]
mod tests {
    use super::OwnedBuffer;
    use std::ffi::CStr;

    #[test]
    fn copies_bytes_with_trailing_nul() {
        let buffer = OwnedBuffer::copy_c_string(b"[1,2]").expect("allocation");
        assert_eq!(buffer.len(), 5);
        let text = unsafe { CStr::from_ptr(buffer.as_ptr().cast()) };
        assert_eq!(text.to_str(), Ok("[1,2]"));
    }

    #[test]
    fn raw_round_trip_releases_once() {
        let raw = OwnedBuffer::copy_c_string(b"").expect("allocation").into_raw();
        assert!(!raw.is_null());
        let adopted = unsafe { OwnedBuffer::from_raw(raw) }.expect("non-null buffer");
        assert!(adopted.is_empty());
        drop(adopted);
        assert!(unsafe { OwnedBuffer::from_raw(std::ptr::null_mut()) }.is_none());
    }
}
