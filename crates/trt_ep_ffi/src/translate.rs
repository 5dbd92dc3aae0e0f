//! Translation between fixed-layout option structs and `TensorrtProviderInfo`.
//!
//! # Responsibility
//! - Validate the versioned input tag once, at the boundary.
//! - Convert external structs to internal configuration and back.
//! - Own the null/empty string policy in both directions.
//!
//! # Invariants
//! - Null and `""` inputs both become an empty internal string.
//! - Empty internal strings always export as null, never as a zero-length buffer.
//! - Non-null exported strings are fresh allocations owned by the receiver.
//! - Numeric and boolean fields copy verbatim; booleans export as `1|0`.

use crate::abi::{OrtTensorRTProviderOptions, OrtTensorRTProviderOptionsV2};
use crate::owned_str::{read_nullable, OwnedCStr};
use std::error::Error;
use std::ffi::{c_int, c_void};
use std::fmt::{Display, Formatter};
use trt_ep_core::{ComputeStreamHandle, TensorrtProviderInfo};

/// Version tag accompanying an untyped options pointer.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsVersion {
    Legacy = 1,
    V2 = 2,
}

impl OptionsVersion {
    pub fn from_raw(value: u32) -> Result<Self, AbiError> {
        match value {
            1 => Ok(Self::Legacy),
            2 => Ok(Self::V2),
            other => Err(AbiError::UnknownOptionsVersion(other)),
        }
    }
}

/// Boundary validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    NullOptions,
    UnknownOptionsVersion(u32),
}

impl Display for AbiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NullOptions => write!(f, "provider options pointer is null"),
            Self::UnknownOptionsVersion(value) => {
                write!(f, "provider options version is unsupported: {value}")
            }
        }
    }
}

impl Error for AbiError {}

/// Version-discriminated external options borrowed from the host.
#[derive(Debug, Clone, Copy)]
pub enum ExternalOptions<'a> {
    Legacy(&'a OrtTensorRTProviderOptions),
    V2(&'a OrtTensorRTProviderOptionsV2),
}

impl<'a> ExternalOptions<'a> {
    /// Interprets an untyped pointer according to its version tag.
    ///
    /// # Safety
    ///
    /// When non-null, `options` must point to a live struct of the layout named
    /// by `version` for the lifetime `'a`.
    pub unsafe fn from_raw(version: u32, options: *const c_void) -> Result<Self, AbiError> {
        let version = OptionsVersion::from_raw(version)?;
        if options.is_null() {
            return Err(AbiError::NullOptions);
        }
        // SAFETY: caller guarantees layout and lifetime for the tagged version.
        let parsed = unsafe {
            match version {
                OptionsVersion::Legacy => {
                    Self::Legacy(&*(options as *const OrtTensorRTProviderOptions))
                }
                OptionsVersion::V2 => Self::V2(&*(options as *const OrtTensorRTProviderOptionsV2)),
            }
        };
        Ok(parsed)
    }

    pub fn version(&self) -> OptionsVersion {
        match self {
            Self::Legacy(_) => OptionsVersion::Legacy,
            Self::V2(_) => OptionsVersion::V2,
        }
    }

    /// Converts to internal configuration; legacy input defaults V2-only fields.
    ///
    /// # Safety
    ///
    /// Every non-null string pointer in the struct must reference a valid
    /// NUL-terminated buffer for the duration of the call.
    pub unsafe fn to_info(&self) -> TensorrtProviderInfo {
        match self {
            // SAFETY: forwarded caller guarantee.
            Self::Legacy(legacy) => unsafe {
                info_from_external(&OrtTensorRTProviderOptionsV2::from_legacy(legacy))
            },
            // SAFETY: forwarded caller guarantee.
            Self::V2(options) => unsafe { info_from_external(options) },
        }
    }
}

/// External to internal conversion.
///
/// The stream handle is copied only when its presence flag is set. The
/// `has_trt_options` discriminant is left for the factory path to decide.
///
/// # Safety
///
/// Every non-null string pointer in `options` must reference a valid
/// NUL-terminated buffer for the duration of the call.
pub unsafe fn info_from_external(options: &OrtTensorRTProviderOptionsV2) -> TensorrtProviderInfo {
    let has_user_compute_stream = options.has_user_compute_stream != 0;
    TensorrtProviderInfo {
        device_id: options.device_id,
        has_user_compute_stream,
        user_compute_stream: if has_user_compute_stream {
            ComputeStreamHandle::from_ptr(options.user_compute_stream)
        } else {
            ComputeStreamHandle::NULL
        },
        has_trt_options: false,
        max_partition_iterations: options.trt_max_partition_iterations,
        min_subgraph_size: options.trt_min_subgraph_size,
        max_workspace_size: options.trt_max_workspace_size,
        fp16_enable: options.trt_fp16_enable != 0,
        int8_enable: options.trt_int8_enable != 0,
        // SAFETY: forwarded caller guarantee for string pointers.
        int8_calibration_table_name: unsafe {
            read_nullable(options.trt_int8_calibration_table_name)
        },
        int8_use_native_calibration_table: options.trt_int8_use_native_calibration_table != 0,
        dla_enable: options.trt_dla_enable != 0,
        dla_core: options.trt_dla_core,
        dump_subgraphs: options.trt_dump_subgraphs != 0,
        engine_cache_enable: options.trt_engine_cache_enable != 0,
        engine_cache_path: unsafe { read_nullable(options.trt_engine_cache_path) },
        engine_decryption_enable: options.trt_engine_decryption_enable != 0,
        engine_decryption_lib_path: unsafe { read_nullable(options.trt_engine_decryption_lib_path) },
        force_sequential_engine_build: options.trt_force_sequential_engine_build != 0,
        context_memory_sharing_enable: options.trt_context_memory_sharing_enable != 0,
    }
}

/// V2 struct built from internal configuration, owning its string buffers.
///
/// Dropping it frees the buffers; `into_raw` hands them to the receiver, who
/// must later call [`release_option_strings`].
#[derive(Debug)]
pub struct ExportedOptions {
    raw: OrtTensorRTProviderOptionsV2,
    int8_calibration_table_name: Option<OwnedCStr>,
    engine_cache_path: Option<OwnedCStr>,
    engine_decryption_lib_path: Option<OwnedCStr>,
}

impl ExportedOptions {
    /// Borrowed view; string pointers stay valid while `self` lives.
    pub fn as_raw(&self) -> &OrtTensorRTProviderOptionsV2 {
        &self.raw
    }

    /// Transfers string ownership to the caller.
    pub fn into_raw(self) -> OrtTensorRTProviderOptionsV2 {
        let mut raw = self.raw;
        raw.trt_int8_calibration_table_name = into_raw_or_null(self.int8_calibration_table_name);
        raw.trt_engine_cache_path = into_raw_or_null(self.engine_cache_path);
        raw.trt_engine_decryption_lib_path = into_raw_or_null(self.engine_decryption_lib_path);
        raw
    }
}

/// Internal to external conversion.
pub fn info_to_external(info: &TensorrtProviderInfo) -> ExportedOptions {
    let int8_calibration_table_name = OwnedCStr::duplicate(&info.int8_calibration_table_name);
    let engine_cache_path = OwnedCStr::duplicate(&info.engine_cache_path);
    let engine_decryption_lib_path = OwnedCStr::duplicate(&info.engine_decryption_lib_path);

    let raw = OrtTensorRTProviderOptionsV2 {
        device_id: info.device_id,
        has_user_compute_stream: flag(info.has_user_compute_stream),
        user_compute_stream: info.user_compute_stream.as_ptr(),
        trt_max_partition_iterations: info.max_partition_iterations,
        trt_min_subgraph_size: info.min_subgraph_size,
        trt_max_workspace_size: info.max_workspace_size,
        trt_fp16_enable: flag(info.fp16_enable),
        trt_int8_enable: flag(info.int8_enable),
        trt_int8_calibration_table_name: ptr_or_null(&int8_calibration_table_name),
        trt_int8_use_native_calibration_table: flag(info.int8_use_native_calibration_table),
        trt_dla_enable: flag(info.dla_enable),
        trt_dla_core: info.dla_core,
        trt_dump_subgraphs: flag(info.dump_subgraphs),
        trt_engine_cache_enable: flag(info.engine_cache_enable),
        trt_engine_cache_path: ptr_or_null(&engine_cache_path),
        trt_engine_decryption_enable: flag(info.engine_decryption_enable),
        trt_engine_decryption_lib_path: ptr_or_null(&engine_decryption_lib_path),
        trt_force_sequential_engine_build: flag(info.force_sequential_engine_build),
        trt_context_memory_sharing_enable: flag(info.context_memory_sharing_enable),
    };

    ExportedOptions {
        raw,
        int8_calibration_table_name,
        engine_cache_path,
        engine_decryption_lib_path,
    }
}

/// Overwrites `out` with `info`, transferring new string buffers to the caller.
///
/// `has_user_compute_stream` and `user_compute_stream` keep the values already
/// in `out`: the stream belongs to the host and is never taken from `info`.
/// Strings previously referenced by `out` are not released.
pub fn update_external(info: &TensorrtProviderInfo, out: &mut OrtTensorRTProviderOptionsV2) {
    let has_user_compute_stream = out.has_user_compute_stream;
    let user_compute_stream = out.user_compute_stream;
    *out = info_to_external(info).into_raw();
    out.has_user_compute_stream = has_user_compute_stream;
    out.user_compute_stream = user_compute_stream;
}

/// Releases every string buffer in `options` and nulls the pointers.
///
/// # Safety
///
/// Each non-null string pointer must come from [`ExportedOptions::into_raw`]
/// (directly or through [`update_external`]) and not have been released yet.
pub unsafe fn release_option_strings(options: &mut OrtTensorRTProviderOptionsV2) {
    for field in [
        &mut options.trt_int8_calibration_table_name,
        &mut options.trt_engine_cache_path,
        &mut options.trt_engine_decryption_lib_path,
    ] {
        // SAFETY: forwarded caller guarantee.
        unsafe { OwnedCStr::release(*field) };
        *field = std::ptr::null();
    }
}

fn flag(value: bool) -> c_int {
    c_int::from(value)
}

fn ptr_or_null(value: &Option<OwnedCStr>) -> *const std::ffi::c_char {
    value
        .as_ref()
        .map_or(std::ptr::null(), |owned| owned.as_ptr())
}

fn into_raw_or_null(value: Option<OwnedCStr>) -> *const std::ffi::c_char {
    value.map_or(std::ptr::null(), OwnedCStr::into_raw)
}
