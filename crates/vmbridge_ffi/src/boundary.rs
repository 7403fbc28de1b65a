//! Shared plumbing for `extern "C"` exports.
//!
//! # Invariants
//! - No panic unwinds out of an export; [`guard`] maps it to a fallback.
//! - Name arguments are `(ptr, len)` pairs and are never read past `len`.

use log::error;
use std::ffi::{c_char, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};
use vmbridge_core::logging::panic_payload_summary;

/// Runs one export body, turning a panic into `fallback`.
pub(crate) fn guard<T>(export: &'static str, fallback: T, body: impl FnOnce() -> T) -> T {
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => value,
        Err(payload) => {
            error!(
                "event=ffi_panic module=ffi status=error export={} payload={}",
                export,
                panic_payload_summary(payload.as_ref())
            );
            fallback
        }
    }
}

/// Borrows a length-delimited name.
///
/// Returns `None` for a null pointer with non-zero length, or bytes that are
/// not UTF-8 (no registered flag name can match those).
///
/// # Safety
/// When non-null, `ptr` must be valid for reads of `len` bytes for `'a`.
pub(crate) unsafe fn name_arg<'a>(ptr: *const c_char, len: usize) -> Option<&'a str> {
    if ptr.is_null() {
        return (len == 0).then_some("");
    }
    let bytes = std::slice::from_raw_parts(ptr.cast::<u8>(), len);
    std::str::from_utf8(bytes).ok()
}

/// Borrows a NUL-terminated string.
///
/// # Safety
/// When non-null, `ptr` must point to a NUL-terminated string valid for `'a`.
pub(crate) unsafe fn c_str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}
