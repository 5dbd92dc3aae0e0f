//! Drives the process-wide lifecycle through the exported table.
//!
//! The singleton starts `Uninitialized` only once per test binary, so this
//! file must hold exactly one test.

use std::ffi::{c_void, CStr};
use trt_ep_core::{LifecycleState, TENSORRT_PROVIDER_TYPE};
use trt_ep_ffi::{
    process_kernel_registry, provider, GetProvider, OptionsVersion, OrtTensorRTProviderOptionsV2,
};

fn registered_tensorrt_kernels() -> usize {
    process_kernel_registry()
        .lock()
        .unwrap()
        .list_by_provider(TENSORRT_PROVIDER_TYPE)
        .len()
}

#[test]
fn host_drives_full_lifecycle_through_function_table() {
    let api = unsafe { &*GetProvider() };
    assert_eq!(provider().lifecycle_state(), LifecycleState::Uninitialized);

    assert_eq!((api.shutdown)(), -1);
    let message = unsafe { CStr::from_ptr((api.last_error)()) };
    assert!(message.to_string_lossy().contains("uninitialized"));

    assert_eq!((api.initialize)(), 0);
    assert!((api.last_error)().is_null());
    assert_eq!(provider().lifecycle_state(), LifecycleState::Initialized);
    assert_eq!(registered_tensorrt_kernels(), 2);

    let options = OrtTensorRTProviderOptionsV2 {
        device_id: 2,
        trt_fp16_enable: 1,
        trt_engine_cache_path: c"/tmp/cache".as_ptr(),
        ..OrtTensorRTProviderOptionsV2::default()
    };
    let raw = &options as *const OrtTensorRTProviderOptionsV2 as *const c_void;

    unsafe {
        let factory = (api.create_factory)(OptionsVersion::V2 as u32, raw);
        assert!(!factory.is_null());
        let instance = (api.factory_create_provider)(factory);
        assert!(!instance.is_null());
        let info = trt_ep_core::ExecutionProvider::info((*instance).provider());
        assert!(info.has_trt_options);
        assert!(info.fp16_enable);
        assert_eq!(info.engine_cache_path, "/tmp/cache");
        (api.release_provider)(instance);
        (api.release_factory)(factory);
    }

    assert_eq!((api.shutdown)(), 0);
    assert_eq!(provider().lifecycle_state(), LifecycleState::ShutDown);
    assert_eq!(registered_tensorrt_kernels(), 0);
    assert_eq!((api.initialize)(), -1);
}
