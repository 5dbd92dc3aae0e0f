//! C-ABI entry point for host runtimes.
//!
//! # Responsibility
//! - Export `GetProvider`, the only symbol the host looks up.
//! - Marshal raw pointers into the typed adapter API and back.
//!
//! # Invariants
//! - Exported functions never panic across the boundary.
//! - Failures return null or `-1` and set a thread-local last-error string;
//!   successful calls leave it clear.
//! - Every pointer this module hands out has a matching `release_*` entry.

use crate::abi::OrtTensorRTProviderOptionsV2;
use crate::config::{adapter_config, AdapterConfig};
use crate::owned_str::read_nullable;
use crate::provider::{process_kernel_registry, provider};
use crate::translate::{release_option_strings, ExternalOptions};
use std::cell::RefCell;
use std::ffi::{c_char, c_int, c_void, CString};
use std::ptr;
use std::sync::{Arc, PoisonError};
use trt_ep_core::{
    init_logging, ExecutionProvider, ProviderOptions, TensorrtExecutionProvider,
    TensorrtProviderFactory,
};

/// Bumped whenever a field is appended to [`TensorrtProviderApi`].
pub const PROVIDER_API_VERSION: u32 = 1;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Generic option mapping as parallel key/value arrays sorted by key.
///
/// Owned by the host once returned; release with `release_provider_options_list`.
#[repr(C)]
#[derive(Debug)]
pub struct ProviderOptionsList {
    pub keys: *mut *mut c_char,
    pub values: *mut *mut c_char,
    pub len: usize,
}

/// Opaque factory handle owned by the host.
pub struct FactoryHandle(Arc<TensorrtProviderFactory>);

/// Opaque provider handle owned by the host.
pub struct ProviderHandle(TensorrtExecutionProvider);

impl ProviderHandle {
    pub fn provider(&self) -> &TensorrtExecutionProvider {
        &self.0
    }
}

/// Function table returned by [`GetProvider`].
#[repr(C)]
pub struct TensorrtProviderApi {
    pub version: u32,
    pub create_factory_for_device: extern "C" fn(device_id: c_int) -> *mut FactoryHandle,
    pub create_factory:
        unsafe extern "C" fn(version: u32, options: *const c_void) -> *mut FactoryHandle,
    pub factory_create_provider:
        unsafe extern "C" fn(factory: *const FactoryHandle) -> *mut ProviderHandle,
    pub release_factory: unsafe extern "C" fn(factory: *mut FactoryHandle),
    pub release_provider: unsafe extern "C" fn(provider: *mut ProviderHandle),
    pub update_provider_options: unsafe extern "C" fn(
        out: *mut OrtTensorRTProviderOptionsV2,
        keys: *const *const c_char,
        values: *const *const c_char,
        len: usize,
    ) -> c_int,
    pub get_provider_options:
        unsafe extern "C" fn(version: u32, options: *const c_void) -> *mut ProviderOptionsList,
    pub release_provider_options_list: unsafe extern "C" fn(list: *mut ProviderOptionsList),
    pub release_provider_options_strings:
        unsafe extern "C" fn(options: *mut OrtTensorRTProviderOptionsV2),
    pub initialize: extern "C" fn() -> c_int,
    pub shutdown: extern "C" fn() -> c_int,
    pub last_error: extern "C" fn() -> *const c_char,
}

static PROVIDER_API: TensorrtProviderApi = TensorrtProviderApi {
    version: PROVIDER_API_VERSION,
    create_factory_for_device: trt_ep_create_factory_for_device,
    create_factory: trt_ep_create_factory,
    factory_create_provider: trt_ep_factory_create_provider,
    release_factory: trt_ep_release_factory,
    release_provider: trt_ep_release_provider,
    update_provider_options: trt_ep_update_provider_options,
    get_provider_options: trt_ep_get_provider_options,
    release_provider_options_list: trt_ep_release_provider_options_list,
    release_provider_options_strings: trt_ep_release_provider_options_strings,
    initialize: trt_ep_initialize,
    shutdown: trt_ep_shutdown,
    last_error: trt_ep_last_error,
};

/// Returns the process-wide adapter function table.
#[allow(non_snake_case)]
#[no_mangle]
pub extern "C" fn GetProvider() -> *const TensorrtProviderApi {
    &PROVIDER_API
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|slot| {
        *slot.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

extern "C" fn trt_ep_create_factory_for_device(device_id: c_int) -> *mut FactoryHandle {
    clear_last_error();
    let factory = provider().create_factory_for_device(device_id);
    Box::into_raw(Box::new(FactoryHandle(factory)))
}

/// # Safety
///
/// `options` must be null or point to a live struct of the layout named by
/// `version`, with valid nullable string pointers.
unsafe extern "C" fn trt_ep_create_factory(
    version: u32,
    options: *const c_void,
) -> *mut FactoryHandle {
    clear_last_error();
    // SAFETY: caller guarantees layout for the tagged version.
    let options = match unsafe { ExternalOptions::from_raw(version, options) } {
        Ok(options) => options,
        Err(err) => {
            set_last_error(&format!("create_factory failed: {err}"));
            return ptr::null_mut();
        }
    };
    // SAFETY: caller guarantees valid string pointers.
    let factory = unsafe { provider().create_factory(options) };
    Box::into_raw(Box::new(FactoryHandle(factory)))
}

/// # Safety
///
/// `factory` must be null or a live handle from a `create_factory*` entry.
unsafe extern "C" fn trt_ep_factory_create_provider(
    factory: *const FactoryHandle,
) -> *mut ProviderHandle {
    clear_last_error();
    // SAFETY: caller guarantees a live handle or null.
    let Some(factory) = (unsafe { factory.as_ref() }) else {
        set_last_error("factory_create_provider failed: factory handle is null");
        return ptr::null_mut();
    };
    let instance = factory.0.create_tensorrt_provider();
    Box::into_raw(Box::new(ProviderHandle(instance)))
}

/// # Safety
///
/// `factory` must be null or a handle not yet released.
unsafe extern "C" fn trt_ep_release_factory(factory: *mut FactoryHandle) {
    if !factory.is_null() {
        // SAFETY: caller guarantees the handle came from Box::into_raw.
        drop(unsafe { Box::from_raw(factory) });
    }
}

/// # Safety
///
/// `provider` must be null or a handle not yet released.
unsafe extern "C" fn trt_ep_release_provider(provider: *mut ProviderHandle) {
    if !provider.is_null() {
        // SAFETY: caller guarantees the handle came from Box::into_raw.
        let handle = unsafe { Box::from_raw(provider) };
        log::debug!(
            "event=provider_release module=api status=ok instance_id={}",
            handle.provider().instance_id()
        );
    }
}

/// # Safety
///
/// `out` must be null or writable; `keys` and `values` must each hold `len`
/// nullable C strings. Null keys are skipped.
unsafe extern "C" fn trt_ep_update_provider_options(
    out: *mut OrtTensorRTProviderOptionsV2,
    keys: *const *const c_char,
    values: *const *const c_char,
    len: usize,
) -> c_int {
    clear_last_error();
    // SAFETY: caller guarantees a writable struct or null.
    let Some(out) = (unsafe { out.as_mut() }) else {
        set_last_error("update_provider_options failed: options pointer is null");
        return -1;
    };
    if len > 0 && (keys.is_null() || values.is_null()) {
        set_last_error("update_provider_options failed: key/value arrays are null");
        return -1;
    }

    let mut options = ProviderOptions::new();
    for index in 0..len {
        // SAFETY: caller guarantees `len` readable entries per array.
        let (key, value) = unsafe { (*keys.add(index), *values.add(index)) };
        if key.is_null() {
            continue;
        }
        // SAFETY: caller guarantees valid nullable C strings.
        let (key, value) = unsafe { (read_nullable(key), read_nullable(value)) };
        options.insert(key, value);
    }

    match provider().update_provider_options(out, &options) {
        Ok(()) => 0,
        Err(err) => {
            set_last_error(&format!("update_provider_options failed: {err}"));
            -1
        }
    }
}

/// Returns the generic mapping; release with `release_provider_options_list`.
///
/// # Safety
///
/// Same contract as `create_factory`.
unsafe extern "C" fn trt_ep_get_provider_options(
    version: u32,
    options: *const c_void,
) -> *mut ProviderOptionsList {
    clear_last_error();
    // SAFETY: caller guarantees layout for the tagged version.
    let options = match unsafe { ExternalOptions::from_raw(version, options) } {
        Ok(options) => options,
        Err(err) => {
            set_last_error(&format!("get_provider_options failed: {err}"));
            return ptr::null_mut();
        }
    };
    // SAFETY: caller guarantees valid string pointers.
    let mapping = unsafe { provider().get_provider_options(options) };
    Box::into_raw(Box::new(into_options_list(&mapping)))
}

/// # Safety
///
/// `list` must be null or a list returned by `get_provider_options` and not
/// released yet.
unsafe extern "C" fn trt_ep_release_provider_options_list(list: *mut ProviderOptionsList) {
    if list.is_null() {
        return;
    }
    // SAFETY: caller guarantees the list came from Box::into_raw.
    let list = unsafe { Box::from_raw(list) };
    // SAFETY: both arrays were built by `into_options_list` with `list.len` entries.
    unsafe {
        release_c_string_array(list.keys, list.len);
        release_c_string_array(list.values, list.len);
    }
}

fn into_options_list(mapping: &ProviderOptions) -> ProviderOptionsList {
    let (keys, values): (Vec<_>, Vec<_>) = mapping
        .iter()
        .map(|(key, value)| (mapping_c_string(key), mapping_c_string(value)))
        .unzip();
    ProviderOptionsList {
        len: keys.len(),
        keys: Box::into_raw(keys.into_boxed_slice()).cast::<*mut c_char>(),
        values: Box::into_raw(values.into_boxed_slice()).cast::<*mut c_char>(),
    }
}

// Empty values stay non-null here; content after an interior NUL is dropped.
fn mapping_c_string(value: &str) -> *mut c_char {
    let visible = value.split('\0').next().unwrap_or_default();
    CString::new(visible).unwrap_or_default().into_raw()
}

/// # Safety
///
/// `items` must be null or an array of `len` strings from `mapping_c_string`,
/// boxed as a slice.
unsafe fn release_c_string_array(items: *mut *mut c_char, len: usize) {
    if items.is_null() {
        return;
    }
    // SAFETY: caller guarantees the boxed-slice origin and length.
    let items = unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(items, len)) };
    for item in items.iter().copied() {
        // SAFETY: every entry came from CString::into_raw.
        drop(unsafe { CString::from_raw(item) });
    }
}

/// # Safety
///
/// `options` must be null or a struct whose string pointers were produced by
/// `update_provider_options` and not released yet.
unsafe extern "C" fn trt_ep_release_provider_options_strings(
    options: *mut OrtTensorRTProviderOptionsV2,
) {
    // SAFETY: caller guarantees a writable struct or null.
    if let Some(options) = unsafe { options.as_mut() } {
        // SAFETY: forwarded caller guarantee for string ownership.
        unsafe { release_option_strings(options) };
    }
}

extern "C" fn trt_ep_initialize() -> c_int {
    initialize_with_config(adapter_config())
}

fn initialize_with_config(config: &AdapterConfig) -> c_int {
    clear_last_error();
    start_logging(config);

    let mut registry = process_kernel_registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    match provider().initialize(&mut *registry) {
        Ok(()) => 0,
        Err(err) => {
            set_last_error(&format!("initialize failed: {err}"));
            -1
        }
    }
}

// Logging stays best effort: a failure never changes the initialize status.
fn start_logging(config: &AdapterConfig) {
    let Some(log_dir) = config.log_dir.as_deref() else {
        return;
    };
    if let Err(err) = init_logging(&config.log_level, log_dir) {
        log::warn!(
            "event=logging_init module=api status=degraded error={}",
            err
        );
    }
}

extern "C" fn trt_ep_shutdown() -> c_int {
    clear_last_error();
    let mut registry = process_kernel_registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    match provider().shutdown(&mut *registry) {
        Ok(()) => 0,
        Err(err) => {
            set_last_error(&format!("shutdown failed: {err}"));
            -1
        }
    }
}

/// Valid until the next call on the same thread; do not release.
extern "C" fn trt_ep_last_error() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(ptr::null(), |message| message.as_ptr())
    })
}

#[cfg(test)]
mod tests {
    use super::{
        initialize_with_config, trt_ep_shutdown, GetProvider, ProviderOptionsList,
        PROVIDER_API_VERSION,
    };
    use crate::config::AdapterConfig;
    use crate::abi::OrtTensorRTProviderOptionsV2;
    use std::ffi::{c_void, CStr};
    use std::ptr;
    use trt_ep_core::{supported_option_keys, ExecutionProvider};

    #[test]
    fn table_reports_version() {
        let api = unsafe { &*GetProvider() };
        assert_eq!(api.version, PROVIDER_API_VERSION);
        assert_eq!(GetProvider(), GetProvider());
    }

    #[test]
    fn factory_handles_produce_independent_providers() {
        let api = unsafe { &*GetProvider() };
        let factory = (api.create_factory_for_device)(2);
        assert!(!factory.is_null());

        unsafe {
            let first = (api.factory_create_provider)(factory);
            let second = (api.factory_create_provider)(factory);
            assert!(!first.is_null());
            assert_ne!(first, second);
            assert_ne!(
                (*first).provider().instance_id(),
                (*second).provider().instance_id()
            );

            (api.release_provider)(first);
            assert_eq!((*second).provider().info().device_id, 2);
            (api.release_provider)(second);
            (api.release_factory)(factory);
        }
    }

    #[test]
    fn unknown_version_sets_last_error() {
        let api = unsafe { &*GetProvider() };
        let options = OrtTensorRTProviderOptionsV2::default();
        let raw = &options as *const OrtTensorRTProviderOptionsV2 as *const c_void;

        let factory = unsafe { (api.create_factory)(7, raw) };
        assert!(factory.is_null());
        let message = unsafe { CStr::from_ptr((api.last_error)()) };
        assert!(message.to_string_lossy().contains("unsupported: 7"));

        let factory = (api.create_factory_for_device)(0);
        assert!((api.last_error)().is_null());
        unsafe { (api.release_factory)(factory) };
    }

    unsafe fn read_list(list: *const ProviderOptionsList) -> Vec<(String, String)> {
        let list = unsafe { &*list };
        (0..list.len)
            .map(|index| unsafe {
                (
                    CStr::from_ptr(*list.keys.add(index)).to_string_lossy().into_owned(),
                    CStr::from_ptr(*list.values.add(index)).to_string_lossy().into_owned(),
                )
            })
            .collect()
    }

    #[test]
    fn get_provider_options_returns_sorted_pairs() {
        let api = unsafe { &*GetProvider() };
        let options = OrtTensorRTProviderOptionsV2 {
            device_id: 3,
            trt_engine_cache_path: c"/tmp/cache".as_ptr(),
            ..OrtTensorRTProviderOptionsV2::default()
        };
        let raw = &options as *const OrtTensorRTProviderOptionsV2 as *const c_void;

        unsafe {
            let list = (api.get_provider_options)(2, raw);
            assert!(!list.is_null());
            let pairs = read_list(list);
            assert_eq!(pairs.len(), supported_option_keys().len());
            assert_eq!(pairs[0], ("device_id".to_string(), "3".to_string()));
            assert!(pairs.windows(2).all(|pair| pair[0].0 < pair[1].0));
            assert!(pairs.contains(&(
                "trt_engine_cache_path".to_string(),
                "/tmp/cache".to_string()
            )));
            assert!(pairs.contains(&("trt_int8_calibration_table_name".to_string(), String::new())));
            (api.release_provider_options_list)(list);
            (api.release_provider_options_list)(ptr::null_mut());
        }
    }

    #[test]
    fn get_provider_options_keeps_newlines_inside_values() {
        let api = unsafe { &*GetProvider() };
        let options = OrtTensorRTProviderOptionsV2 {
            trt_engine_cache_path: c"/tmp/a\ntrt_fp16_enable=true".as_ptr(),
            ..OrtTensorRTProviderOptionsV2::default()
        };
        let raw = &options as *const OrtTensorRTProviderOptionsV2 as *const c_void;

        unsafe {
            let list = (api.get_provider_options)(2, raw);
            let pairs = read_list(list);
            let cache_path = pairs
                .iter()
                .find(|(key, _)| key == "trt_engine_cache_path")
                .map(|(_, value)| value.as_str());
            assert_eq!(cache_path, Some("/tmp/a\ntrt_fp16_enable=true"));
            let fp16 = pairs
                .iter()
                .filter(|(key, _)| key == "trt_fp16_enable")
                .map(|(_, value)| value.as_str())
                .collect::<Vec<_>>();
            assert_eq!(fp16, ["false"]);
            (api.release_provider_options_list)(list);
        }
    }

    #[test]
    fn update_provider_options_parses_key_value_arrays() {
        let api = unsafe { &*GetProvider() };
        let keys = [c"device_id".as_ptr(), ptr::null(), c"trt_fp16_enable".as_ptr()];
        let values = [c"9".as_ptr(), c"ignored".as_ptr(), c"true".as_ptr()];
        let mut out = OrtTensorRTProviderOptionsV2::default();

        unsafe {
            let status =
                (api.update_provider_options)(&mut out, keys.as_ptr(), values.as_ptr(), keys.len());
            assert_eq!(status, 0);
            assert_eq!(out.device_id, 9);
            assert_eq!(out.trt_fp16_enable, 1);
            assert!(out.trt_engine_cache_path.is_null());
            (api.release_provider_options_strings)(&mut out);

            let status = (api.update_provider_options)(ptr::null_mut(), ptr::null(), ptr::null(), 0);
            assert_eq!(status, -1);
        }
    }

    // Only test in this binary that drives the process-wide lifecycle.
    #[test]
    fn logging_failure_does_not_report_an_error_from_initialize() {
        let api = unsafe { &*GetProvider() };
        let config = AdapterConfig {
            log_dir: Some("relative/logs".to_string()),
            log_level: "info".to_string(),
        };

        assert_eq!(initialize_with_config(&config), 0);
        assert!((api.last_error)().is_null());
        assert_eq!(trt_ep_shutdown(), 0);
    }
}
