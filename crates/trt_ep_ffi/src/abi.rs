//! Fixed-layout option structs shared with the host.
//!
//! # Invariants
//! - Field order and widths never change once shipped; new fields only appear
//!   in new versioned structs.
//! - String pointers are nullable and borrowed on input; on output they are
//!   owned by the caller (see `owned_str`).

use std::ffi::{c_char, c_int, c_void};
use std::ptr;

/// Legacy TensorRT options layout.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OrtTensorRTProviderOptions {
    pub device_id: c_int,
    pub has_user_compute_stream: c_int,
    pub user_compute_stream: *mut c_void,
    pub trt_max_partition_iterations: c_int,
    pub trt_min_subgraph_size: c_int,
    pub trt_max_workspace_size: usize,
    pub trt_fp16_enable: c_int,
    pub trt_int8_enable: c_int,
    pub trt_int8_calibration_table_name: *const c_char,
    pub trt_int8_use_native_calibration_table: c_int,
    pub trt_dla_enable: c_int,
    pub trt_dla_core: c_int,
    pub trt_dump_subgraphs: c_int,
    pub trt_engine_cache_enable: c_int,
    pub trt_engine_cache_path: *const c_char,
    pub trt_engine_decryption_enable: c_int,
    pub trt_engine_decryption_lib_path: *const c_char,
    pub trt_force_sequential_engine_build: c_int,
}

/// Extended TensorRT options layout used for construction and updates.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OrtTensorRTProviderOptionsV2 {
    pub device_id: c_int,
    pub has_user_compute_stream: c_int,
    pub user_compute_stream: *mut c_void,
    pub trt_max_partition_iterations: c_int,
    pub trt_min_subgraph_size: c_int,
    pub trt_max_workspace_size: usize,
    pub trt_fp16_enable: c_int,
    pub trt_int8_enable: c_int,
    pub trt_int8_calibration_table_name: *const c_char,
    pub trt_int8_use_native_calibration_table: c_int,
    pub trt_dla_enable: c_int,
    pub trt_dla_core: c_int,
    pub trt_dump_subgraphs: c_int,
    pub trt_engine_cache_enable: c_int,
    pub trt_engine_cache_path: *const c_char,
    pub trt_engine_decryption_enable: c_int,
    pub trt_engine_decryption_lib_path: *const c_char,
    pub trt_force_sequential_engine_build: c_int,
    pub trt_context_memory_sharing_enable: c_int,
}

impl Default for OrtTensorRTProviderOptions {
    fn default() -> Self {
        Self {
            device_id: 0,
            has_user_compute_stream: 0,
            user_compute_stream: ptr::null_mut(),
            trt_max_partition_iterations: 0,
            trt_min_subgraph_size: 0,
            trt_max_workspace_size: 0,
            trt_fp16_enable: 0,
            trt_int8_enable: 0,
            trt_int8_calibration_table_name: ptr::null(),
            trt_int8_use_native_calibration_table: 0,
            trt_dla_enable: 0,
            trt_dla_core: 0,
            trt_dump_subgraphs: 0,
            trt_engine_cache_enable: 0,
            trt_engine_cache_path: ptr::null(),
            trt_engine_decryption_enable: 0,
            trt_engine_decryption_lib_path: ptr::null(),
            trt_force_sequential_engine_build: 0,
        }
    }
}

impl Default for OrtTensorRTProviderOptionsV2 {
    fn default() -> Self {
        Self::from_legacy(&OrtTensorRTProviderOptions::default())
    }
}

impl OrtTensorRTProviderOptionsV2 {
    /// Widens a legacy struct; V2-only fields take their type-default.
    ///
    /// String pointers are copied, not duplicated: the result borrows the same
    /// buffers as `legacy`.
    pub fn from_legacy(legacy: &OrtTensorRTProviderOptions) -> Self {
        Self {
            device_id: legacy.device_id,
            has_user_compute_stream: legacy.has_user_compute_stream,
            user_compute_stream: legacy.user_compute_stream,
            trt_max_partition_iterations: legacy.trt_max_partition_iterations,
            trt_min_subgraph_size: legacy.trt_min_subgraph_size,
            trt_max_workspace_size: legacy.trt_max_workspace_size,
            trt_fp16_enable: legacy.trt_fp16_enable,
            trt_int8_enable: legacy.trt_int8_enable,
            trt_int8_calibration_table_name: legacy.trt_int8_calibration_table_name,
            trt_int8_use_native_calibration_table: legacy.trt_int8_use_native_calibration_table,
            trt_dla_enable: legacy.trt_dla_enable,
            trt_dla_core: legacy.trt_dla_core,
            trt_dump_subgraphs: legacy.trt_dump_subgraphs,
            trt_engine_cache_enable: legacy.trt_engine_cache_enable,
            trt_engine_cache_path: legacy.trt_engine_cache_path,
            trt_engine_decryption_enable: legacy.trt_engine_decryption_enable,
            trt_engine_decryption_lib_path: legacy.trt_engine_decryption_lib_path,
            trt_force_sequential_engine_build: legacy.trt_force_sequential_engine_build,
            trt_context_memory_sharing_enable: 0,
        }
    }
}

/// Per-key presence of each option in the two struct versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldCompat {
    pub key: &'static str,
    pub in_legacy: bool,
    pub in_v2: bool,
}

const fn both(key: &'static str) -> FieldCompat {
    FieldCompat {
        key,
        in_legacy: true,
        in_v2: true,
    }
}

/// Explicit legacy/V2 compatibility table keyed by generic option name.
pub const FIELD_COMPATIBILITY: &[FieldCompat] = &[
    both("device_id"),
    both("has_user_compute_stream"),
    both("user_compute_stream"),
    both("trt_max_partition_iterations"),
    both("trt_min_subgraph_size"),
    both("trt_max_workspace_size"),
    both("trt_fp16_enable"),
    both("trt_int8_enable"),
    both("trt_int8_calibration_table_name"),
    both("trt_int8_use_native_calibration_table"),
    both("trt_dla_enable"),
    both("trt_dla_core"),
    both("trt_dump_subgraphs"),
    both("trt_engine_cache_enable"),
    both("trt_engine_cache_path"),
    both("trt_engine_decryption_enable"),
    both("trt_engine_decryption_lib_path"),
    both("trt_force_sequential_engine_build"),
    FieldCompat {
        key: "trt_context_memory_sharing_enable",
        in_legacy: false,
        in_v2: true,
    },
];

/// Keys whose values are defaulted when reading a legacy struct.
pub fn legacy_defaulted_keys() -> impl Iterator<Item = &'static str> {
    FIELD_COMPATIBILITY
        .iter()
        .filter(|field| field.in_v2 && !field.in_legacy)
        .map(|field| field.key)
}
