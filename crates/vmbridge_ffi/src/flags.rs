//! C exports for the process-wide flag registry.
//!
//! # FFI contract
//! - Names are `(ptr, len)` pairs; no NUL terminator is required.
//! - Set/get return `false` for unknown names; that is not an error.
//! - `vmbridge_get_flag_*` writes `out` only on success.
//! - Every `FlagGroup` from `vmbridge_get_flags` must be passed to
//!   `vmbridge_release_flags`; release zeroes the group, so a repeated
//!   release of the same group is a no-op.

use crate::boundary::{guard, name_arg};
use crate::buffer::OwnedBuffer;
use log::warn;
use std::ffi::{c_char, c_int, CString};
use std::ptr;
use vmbridge_core::{global_registry, parse_overrides, FlagScalar, FlagSnapshot};

/// Snapshot of flag names laid out as parallel C arrays.
#[repr(C)]
#[derive(Debug)]
pub struct FlagGroup {
    /// `size` NUL-terminated name copies.
    pub names: *mut *mut c_char,
    /// `size` kind tags: `0` bool, `1` int.
    pub types: *mut c_int,
    pub size: usize,
}

impl FlagGroup {
    pub const fn empty() -> Self {
        Self {
            names: ptr::null_mut(),
            types: ptr::null_mut(),
            size: 0,
        }
    }

    pub fn is_released(&self) -> bool {
        self.names.is_null() && self.types.is_null()
    }

    /// Moves a snapshot into C-owned arrays.
    pub fn from_snapshot(snapshot: FlagSnapshot) -> Self {
        let mut names = Vec::with_capacity(snapshot.len());
        let mut types = Vec::with_capacity(snapshot.len());
        for entry in snapshot {
            types.push(entry.tag() as c_int);
            // Registered names never contain NUL; fall back to "" regardless.
            let name = CString::new(entry.name).unwrap_or_default();
            names.push(name.into_raw());
        }

        let names = names.into_boxed_slice();
        let types = types.into_boxed_slice();
        let size = names.len();
        Self {
            names: Box::into_raw(names).cast::<*mut c_char>(),
            types: Box::into_raw(types).cast::<c_int>(),
            size,
        }
    }

    /// Frees every name, then both arrays, then zeroes `self`.
    ///
    /// # Safety
    /// `self` must be zeroed or produced by [`from_snapshot`](Self::from_snapshot)
    /// and not modified since.
    pub unsafe fn release(&mut self) -> usize {
        if self.is_released() {
            return 0;
        }
        let size = self.size;
        if !self.names.is_null() {
            let names = Box::from_raw(ptr::slice_from_raw_parts_mut(self.names, size));
            for &name in names.iter() {
                if !name.is_null() {
                    drop(CString::from_raw(name));
                }
            }
        }
        if !self.types.is_null() {
            drop(Box::from_raw(ptr::slice_from_raw_parts_mut(self.types, size)));
        }
        *self = Self::empty();
        size
    }

    /// Copies the entries back out as `(name, tag)` pairs.
    ///
    /// # Safety
    /// Same requirements as [`release`](Self::release).
    pub unsafe fn to_entries(&self) -> Vec<(String, c_int)> {
        if self.is_released() {
            return Vec::new();
        }
        (0..self.size)
            .map(|index| {
                let name = std::ffi::CStr::from_ptr(*self.names.add(index))
                    .to_string_lossy()
                    .into_owned();
                (name, *self.types.add(index))
            })
            .collect()
    }
}

unsafe fn set_flag<T: FlagScalar>(name: *const c_char, name_len: usize, value: T) -> bool {
    match name_arg(name, name_len) {
        Some(name) => global_registry().set(name, value),
        None => false,
    }
}

unsafe fn get_flag<T: FlagScalar>(name: *const c_char, name_len: usize, out: *mut T) -> bool {
    if out.is_null() {
        return false;
    }
    let Some(value) = name_arg(name, name_len).and_then(|name| global_registry().get::<T>(name))
    else {
        return false;
    };
    out.write(value);
    true
}

/// Sets boolean flag `name` to `value`.
///
/// # Safety
/// `name` must be valid for reads of `name_len` bytes.
#[no_mangle]
pub unsafe extern "C" fn vmbridge_set_flag_bool(
    name: *const c_char,
    name_len: usize,
    value: bool,
) -> bool {
    guard("vmbridge_set_flag_bool", false, || set_flag(name, name_len, value))
}

/// Sets integer flag `name` to `value`.
///
/// # Safety
/// `name` must be valid for reads of `name_len` bytes.
#[no_mangle]
pub unsafe extern "C" fn vmbridge_set_flag_int(
    name: *const c_char,
    name_len: usize,
    value: c_int,
) -> bool {
    guard("vmbridge_set_flag_int", false, || set_flag(name, name_len, value))
}

/// Reads boolean flag `name` into `out`.
///
/// # Safety
/// `name` must be valid for reads of `name_len` bytes; `out` must be null or
/// valid for one write.
#[no_mangle]
pub unsafe extern "C" fn vmbridge_get_flag_bool(
    name: *const c_char,
    name_len: usize,
    out: *mut bool,
) -> bool {
    guard("vmbridge_get_flag_bool", false, || get_flag(name, name_len, out))
}

/// Reads integer flag `name` into `out`.
///
/// # Safety
/// `name` must be valid for reads of `name_len` bytes; `out` must be null or
/// valid for one write.
#[no_mangle]
pub unsafe extern "C" fn vmbridge_get_flag_int(
    name: *const c_char,
    name_len: usize,
    out: *mut c_int,
) -> bool {
    guard("vmbridge_get_flag_int", false, || get_flag(name, name_len, out))
}

/// Enumerates every flag: booleans first, then integers.
#[no_mangle]
pub extern "C" fn vmbridge_get_flags() -> FlagGroup {
    guard("vmbridge_get_flags", FlagGroup::empty(), || {
        FlagGroup::from_snapshot(global_registry().snapshot())
    })
}

/// Releases a group returned by `vmbridge_get_flags` and zeroes it.
///
/// # Safety
/// `group` must be null or point to a group from `vmbridge_get_flags`,
/// possibly already released through this function.
#[no_mangle]
pub unsafe extern "C" fn vmbridge_release_flags(group: *mut FlagGroup) {
    let Some(group) = group.as_mut() else {
        return;
    };
    guard("vmbridge_release_flags", 0, || group.release());
}

/// Applies a comma-separated override list to the registry.
///
/// Returns the number of items naming unknown flags, or `-1` when the list
/// does not parse (nothing is applied then).
///
/// # Safety
/// `list` must be valid for reads of `list_len` bytes.
#[no_mangle]
pub unsafe extern "C" fn vmbridge_apply_flag_overrides(
    list: *const c_char,
    list_len: usize,
) -> c_int {
    guard("vmbridge_apply_flag_overrides", -1, || {
        let Some(list) = name_arg(list, list_len) else {
            return -1;
        };
        let overrides = match parse_overrides(list) {
            Ok(overrides) => overrides,
            Err(err) => {
                warn!("event=flag_override module=ffi status=rejected reason=\"{err}\"");
                return -1;
            }
        };
        let report = global_registry().apply_overrides(&overrides);
        c_int::try_from(report.failures.len()).unwrap_or(c_int::MAX)
    })
}

/// Serializes the snapshot as a JSON array of `{"name","kind"}` objects.
///
/// Returns a NUL-terminated buffer owned by the caller (release with
/// `vmbridge_free`), or null on failure.
#[no_mangle]
pub extern "C" fn vmbridge_flags_json() -> *mut c_char {
    guard("vmbridge_flags_json", ptr::null_mut(), || {
        let snapshot = global_registry().snapshot();
        let json = match serde_json::to_vec(&snapshot) {
            Ok(json) => json,
            Err(err) => {
                warn!("event=flags_json module=ffi status=error reason=\"{err}\"");
                return ptr::null_mut();
            }
        };
        OwnedBuffer::copy_c_string(&json)
            .map(|buffer| buffer.into_raw().cast::<c_char>())
            .unwrap_or(ptr::null_mut())
    })
}
