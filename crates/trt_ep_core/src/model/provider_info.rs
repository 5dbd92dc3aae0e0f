//! Internal TensorRT provider configuration.
//!
//! # Responsibility
//! - Define the strongly-typed configuration captured by provider factories.
//! - Keep one owned, non-nullable shape for every option the host can set.
//!
//! # Invariants
//! - Empty string is the canonical "unset" value for string options.
//! - `user_compute_stream` is meaningful only when `has_user_compute_stream`.
//! - Values are never range-checked here; the execution engine owns validation.

use serde::{Deserialize, Serialize};
use std::ffi::c_void;

/// Provider type string reported by every provider instance.
pub const TENSORRT_PROVIDER_TYPE: &str = "TensorrtExecutionProvider";

/// Opaque compute-stream handle supplied by the host.
///
/// Stored as an address so configuration stays `Send + Sync`; the handle is
/// never dereferenced by this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComputeStreamHandle(usize);

impl ComputeStreamHandle {
    /// Null handle, the type-default.
    pub const NULL: Self = Self(0);

    pub fn from_ptr(ptr: *mut c_void) -> Self {
        Self(ptr as usize)
    }

    pub fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }

    pub fn addr(self) -> usize {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Configuration snapshot consumed by the TensorRT execution engine.
///
/// Field set mirrors the extended external options struct one-to-one, plus
/// the `has_trt_options` discriminant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TensorrtProviderInfo {
    pub device_id: i32,
    pub has_user_compute_stream: bool,
    pub user_compute_stream: ComputeStreamHandle,
    /// `true` when built from fully specified options, `false` for the
    /// device-only path. Downstream code uses it to pick defaults vs explicit values.
    pub has_trt_options: bool,
    pub max_partition_iterations: i32,
    pub min_subgraph_size: i32,
    pub max_workspace_size: usize,
    pub fp16_enable: bool,
    pub int8_enable: bool,
    pub int8_calibration_table_name: String,
    pub int8_use_native_calibration_table: bool,
    pub dla_enable: bool,
    pub dla_core: i32,
    pub dump_subgraphs: bool,
    pub engine_cache_enable: bool,
    pub engine_cache_path: String,
    pub engine_decryption_enable: bool,
    pub engine_decryption_lib_path: String,
    pub force_sequential_engine_build: bool,
    pub context_memory_sharing_enable: bool,
}

impl TensorrtProviderInfo {
    /// Builds the minimal device-only configuration.
    ///
    /// # Invariants
    /// - Every field other than `device_id` stays at its type-default.
    /// - `has_trt_options` is `false`.
    pub fn for_device(device_id: i32) -> Self {
        Self {
            device_id,
            has_trt_options: false,
            ..Self::default()
        }
    }

    /// Returns the stream handle when the host supplied one.
    pub fn user_compute_stream(&self) -> Option<ComputeStreamHandle> {
        self.has_user_compute_stream
            .then_some(self.user_compute_stream)
    }
}
