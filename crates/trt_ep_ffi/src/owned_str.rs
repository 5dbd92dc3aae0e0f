//! Owned C strings handed across the boundary.
//!
//! # Invariants
//! - An `OwnedCStr` is never empty; empty input maps to "no string" (null).
//! - A pointer produced by `into_raw` must be released exactly once through
//!   `OwnedCStr::release`.

use std::ffi::{c_char, CStr, CString};

/// Non-empty, heap-allocated C string whose ownership can move to the host.
#[derive(Debug, PartialEq, Eq)]
pub struct OwnedCStr(CString);

impl OwnedCStr {
    /// Duplicates `value` into a fresh buffer.
    ///
    /// Content after an interior NUL is dropped, matching what a C reader
    /// would see. Returns `None` when nothing remains.
    /// Allocation failure aborts the process.
    pub fn duplicate(value: &str) -> Option<Self> {
        let bytes = value.as_bytes();
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        if end == 0 {
            return None;
        }
        CString::new(&bytes[..end]).ok().map(Self)
    }

    pub fn as_c_str(&self) -> &CStr {
        &self.0
    }

    pub fn as_ptr(&self) -> *const c_char {
        self.0.as_ptr()
    }

    /// Transfers ownership of the buffer to the caller.
    pub fn into_raw(self) -> *const c_char {
        self.0.into_raw()
    }

    /// Releases a buffer previously returned by `into_raw`. Null is a no-op.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or come from `OwnedCStr::into_raw` and not have been
    /// released already.
    pub unsafe fn release(ptr: *const c_char) {
        if !ptr.is_null() {
            // SAFETY: caller guarantees ptr was produced by CString::into_raw.
            drop(unsafe { CString::from_raw(ptr as *mut c_char) });
        }
    }
}

/// Reads a borrowed, nullable C string; null and `""` both yield an empty string.
///
/// Invalid UTF-8 is replaced lossily.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated buffer valid for the call.
pub unsafe fn read_nullable(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    // SAFETY: caller guarantees a valid NUL-terminated buffer.
    unsafe { CStr::from_ptr(ptr) }
        .to_string_lossy()
        .into_owned()
}
