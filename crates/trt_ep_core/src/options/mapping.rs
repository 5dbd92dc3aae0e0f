//! Generic string-keyed option mapping for tooling.
//!
//! # Responsibility
//! - Convert `TensorrtProviderInfo` to and from a `key -> value` string table.
//! - Own the stable key names shared with the extended options struct.
//!
//! # Invariants
//! - Output always contains every known key, including default-valued ones.
//! - Unknown input keys are ignored; absent keys keep their type-default.
//! - Values are parsed, never range-checked.

use crate::model::provider_info::{ComputeStreamHandle, TensorrtProviderInfo};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Generic provider option table.
pub type ProviderOptions = BTreeMap<String, String>;

pub const KEY_DEVICE_ID: &str = "device_id";
pub const KEY_HAS_USER_COMPUTE_STREAM: &str = "has_user_compute_stream";
pub const KEY_USER_COMPUTE_STREAM: &str = "user_compute_stream";
pub const KEY_MAX_PARTITION_ITERATIONS: &str = "trt_max_partition_iterations";
pub const KEY_MIN_SUBGRAPH_SIZE: &str = "trt_min_subgraph_size";
pub const KEY_MAX_WORKSPACE_SIZE: &str = "trt_max_workspace_size";
pub const KEY_FP16_ENABLE: &str = "trt_fp16_enable";
pub const KEY_INT8_ENABLE: &str = "trt_int8_enable";
pub const KEY_INT8_CALIBRATION_TABLE_NAME: &str = "trt_int8_calibration_table_name";
pub const KEY_INT8_USE_NATIVE_CALIBRATION_TABLE: &str = "trt_int8_use_native_calibration_table";
pub const KEY_DLA_ENABLE: &str = "trt_dla_enable";
pub const KEY_DLA_CORE: &str = "trt_dla_core";
pub const KEY_DUMP_SUBGRAPHS: &str = "trt_dump_subgraphs";
pub const KEY_ENGINE_CACHE_ENABLE: &str = "trt_engine_cache_enable";
pub const KEY_ENGINE_CACHE_PATH: &str = "trt_engine_cache_path";
pub const KEY_ENGINE_DECRYPTION_ENABLE: &str = "trt_engine_decryption_enable";
pub const KEY_ENGINE_DECRYPTION_LIB_PATH: &str = "trt_engine_decryption_lib_path";
pub const KEY_FORCE_SEQUENTIAL_ENGINE_BUILD: &str = "trt_force_sequential_engine_build";
pub const KEY_CONTEXT_MEMORY_SHARING_ENABLE: &str = "trt_context_memory_sharing_enable";

const SUPPORTED_OPTION_KEYS: &[&str] = &[
    KEY_DEVICE_ID,
    KEY_HAS_USER_COMPUTE_STREAM,
    KEY_USER_COMPUTE_STREAM,
    KEY_MAX_PARTITION_ITERATIONS,
    KEY_MIN_SUBGRAPH_SIZE,
    KEY_MAX_WORKSPACE_SIZE,
    KEY_FP16_ENABLE,
    KEY_INT8_ENABLE,
    KEY_INT8_CALIBRATION_TABLE_NAME,
    KEY_INT8_USE_NATIVE_CALIBRATION_TABLE,
    KEY_DLA_ENABLE,
    KEY_DLA_CORE,
    KEY_DUMP_SUBGRAPHS,
    KEY_ENGINE_CACHE_ENABLE,
    KEY_ENGINE_CACHE_PATH,
    KEY_ENGINE_DECRYPTION_ENABLE,
    KEY_ENGINE_DECRYPTION_LIB_PATH,
    KEY_FORCE_SEQUENTIAL_ENGINE_BUILD,
    KEY_CONTEXT_MEMORY_SHARING_ENABLE,
];

/// Returns every key emitted by [`to_provider_options`].
pub fn supported_option_keys() -> &'static [&'static str] {
    SUPPORTED_OPTION_KEYS
}

/// Generic mapping parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for OptionsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(
                f,
                "option `{key}` has invalid value `{value}`; expected {expected}"
            ),
        }
    }
}

impl Error for OptionsError {}

/// Emits every known option as a string.
///
/// Booleans render as `true|false`; the stream handle renders as its decimal
/// address. The `has_trt_options` discriminant is not part of the mapping.
pub fn to_provider_options(info: &TensorrtProviderInfo) -> ProviderOptions {
    let entries: [(&str, String); 19] = [
        (KEY_DEVICE_ID, info.device_id.to_string()),
        (
            KEY_HAS_USER_COMPUTE_STREAM,
            info.has_user_compute_stream.to_string(),
        ),
        (
            KEY_USER_COMPUTE_STREAM,
            info.user_compute_stream.addr().to_string(),
        ),
        (
            KEY_MAX_PARTITION_ITERATIONS,
            info.max_partition_iterations.to_string(),
        ),
        (KEY_MIN_SUBGRAPH_SIZE, info.min_subgraph_size.to_string()),
        (KEY_MAX_WORKSPACE_SIZE, info.max_workspace_size.to_string()),
        (KEY_FP16_ENABLE, info.fp16_enable.to_string()),
        (KEY_INT8_ENABLE, info.int8_enable.to_string()),
        (
            KEY_INT8_CALIBRATION_TABLE_NAME,
            info.int8_calibration_table_name.clone(),
        ),
        (
            KEY_INT8_USE_NATIVE_CALIBRATION_TABLE,
            info.int8_use_native_calibration_table.to_string(),
        ),
        (KEY_DLA_ENABLE, info.dla_enable.to_string()),
        (KEY_DLA_CORE, info.dla_core.to_string()),
        (KEY_DUMP_SUBGRAPHS, info.dump_subgraphs.to_string()),
        (KEY_ENGINE_CACHE_ENABLE, info.engine_cache_enable.to_string()),
        (KEY_ENGINE_CACHE_PATH, info.engine_cache_path.clone()),
        (
            KEY_ENGINE_DECRYPTION_ENABLE,
            info.engine_decryption_enable.to_string(),
        ),
        (
            KEY_ENGINE_DECRYPTION_LIB_PATH,
            info.engine_decryption_lib_path.clone(),
        ),
        (
            KEY_FORCE_SEQUENTIAL_ENGINE_BUILD,
            info.force_sequential_engine_build.to_string(),
        ),
        (
            KEY_CONTEXT_MEMORY_SHARING_ENABLE,
            info.context_memory_sharing_enable.to_string(),
        ),
    ];

    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Parses a generic mapping into internal configuration.
///
/// # Errors
/// - Returns `OptionsError::InvalidValue` when a known key carries a value
///   that does not parse as the field's type.
pub fn from_provider_options(options: &ProviderOptions) -> Result<TensorrtProviderInfo, OptionsError> {
    let mut info = TensorrtProviderInfo::default();

    parse_into(options, KEY_DEVICE_ID, &mut info.device_id)?;
    parse_bool_into(
        options,
        KEY_HAS_USER_COMPUTE_STREAM,
        &mut info.has_user_compute_stream,
    )?;
    let mut stream_addr = info.user_compute_stream.addr();
    parse_into(options, KEY_USER_COMPUTE_STREAM, &mut stream_addr)?;
    info.user_compute_stream = ComputeStreamHandle::from_addr(stream_addr);
    parse_into(
        options,
        KEY_MAX_PARTITION_ITERATIONS,
        &mut info.max_partition_iterations,
    )?;
    parse_into(options, KEY_MIN_SUBGRAPH_SIZE, &mut info.min_subgraph_size)?;
    parse_into(options, KEY_MAX_WORKSPACE_SIZE, &mut info.max_workspace_size)?;
    parse_bool_into(options, KEY_FP16_ENABLE, &mut info.fp16_enable)?;
    parse_bool_into(options, KEY_INT8_ENABLE, &mut info.int8_enable)?;
    copy_string_into(
        options,
        KEY_INT8_CALIBRATION_TABLE_NAME,
        &mut info.int8_calibration_table_name,
    );
    parse_bool_into(
        options,
        KEY_INT8_USE_NATIVE_CALIBRATION_TABLE,
        &mut info.int8_use_native_calibration_table,
    )?;
    parse_bool_into(options, KEY_DLA_ENABLE, &mut info.dla_enable)?;
    parse_into(options, KEY_DLA_CORE, &mut info.dla_core)?;
    parse_bool_into(options, KEY_DUMP_SUBGRAPHS, &mut info.dump_subgraphs)?;
    parse_bool_into(
        options,
        KEY_ENGINE_CACHE_ENABLE,
        &mut info.engine_cache_enable,
    )?;
    copy_string_into(options, KEY_ENGINE_CACHE_PATH, &mut info.engine_cache_path);
    parse_bool_into(
        options,
        KEY_ENGINE_DECRYPTION_ENABLE,
        &mut info.engine_decryption_enable,
    )?;
    copy_string_into(
        options,
        KEY_ENGINE_DECRYPTION_LIB_PATH,
        &mut info.engine_decryption_lib_path,
    );
    parse_bool_into(
        options,
        KEY_FORCE_SEQUENTIAL_ENGINE_BUILD,
        &mut info.force_sequential_engine_build,
    )?;
    parse_bool_into(
        options,
        KEY_CONTEXT_MEMORY_SHARING_ENABLE,
        &mut info.context_memory_sharing_enable,
    )?;

    Ok(info)
}

fn parse_into<T: FromStr>(
    options: &ProviderOptions,
    key: &'static str,
    target: &mut T,
) -> Result<(), OptionsError> {
    let Some(raw) = options.get(key) else {
        return Ok(());
    };
    *target = raw.parse::<T>().map_err(|_| OptionsError::InvalidValue {
        key,
        value: raw.clone(),
        expected: std::any::type_name::<T>(),
    })?;
    Ok(())
}

fn parse_bool_into(
    options: &ProviderOptions,
    key: &'static str,
    target: &mut bool,
) -> Result<(), OptionsError> {
    let Some(raw) = options.get(key) else {
        return Ok(());
    };
    *target = parse_bool(raw).ok_or_else(|| OptionsError::InvalidValue {
        key,
        value: raw.clone(),
        expected: "true|false|1|0",
    })?;
    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn copy_string_into(options: &ProviderOptions, key: &'static str, target: &mut String) {
    if let Some(raw) = options.get(key) {
        target.clone_from(raw);
    }
}
