//! Option construction and read paths through the exported table.
//!
//! Lifecycle coverage lives in `entry_point_lifecycle.rs`; nothing here calls
//! `initialize` or `shutdown`.

use std::collections::BTreeMap;
use std::ffi::{c_void, CStr};
use std::ptr;
use trt_ep_ffi::{
    GetProvider, OptionsVersion, OrtTensorRTProviderOptions, OrtTensorRTProviderOptionsV2,
    ProviderOptionsList,
};

unsafe fn collect_list(list: *const ProviderOptionsList) -> BTreeMap<String, String> {
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
fn legacy_struct_is_accepted_for_construction_and_read() {
    let api = unsafe { &*GetProvider() };
    let legacy = OrtTensorRTProviderOptions {
        device_id: 1,
        trt_int8_enable: 1,
        trt_int8_calibration_table_name: c"calib".as_ptr(),
        ..OrtTensorRTProviderOptions::default()
    };
    let raw = &legacy as *const OrtTensorRTProviderOptions as *const c_void;

    unsafe {
        let list = (api.get_provider_options)(OptionsVersion::Legacy as u32, raw);
        assert!(!list.is_null());
        let mapping = collect_list(list);
        assert_eq!(mapping["trt_int8_calibration_table_name"], "calib");
        assert_eq!(mapping["trt_context_memory_sharing_enable"], "false");
        (api.release_provider_options_list)(list);

        let factory = (api.create_factory)(OptionsVersion::Legacy as u32, raw);
        assert!(!factory.is_null());
        (api.release_factory)(factory);

        assert!((api.get_provider_options)(2, ptr::null()).is_null());
        assert!(!(api.last_error)().is_null());
    }
}

#[test]
fn update_keeps_host_stream_through_table() {
    let api = unsafe { &*GetProvider() };
    let stream = 0x7000usize as *mut c_void;
    let mut out = OrtTensorRTProviderOptionsV2 {
        has_user_compute_stream: 1,
        user_compute_stream: stream,
        ..OrtTensorRTProviderOptionsV2::default()
    };
    let keys = [c"device_id".as_ptr(), c"user_compute_stream".as_ptr()];
    let values = [c"1".as_ptr(), c"3735928559".as_ptr()];

    unsafe {
        let status =
            (api.update_provider_options)(&mut out, keys.as_ptr(), values.as_ptr(), keys.len());
        assert_eq!(status, 0);
        assert_eq!(out.device_id, 1);
        assert_eq!(out.has_user_compute_stream, 1);
        assert_eq!(out.user_compute_stream, stream);
        (api.release_provider_options_strings)(&mut out);
    }
}
