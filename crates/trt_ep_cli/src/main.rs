//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `trt_ep_core` linkage without a host runtime.
//! - Print the default generic option mapping for tooling reference.

use trt_ep_core::{to_provider_options, TensorrtProviderInfo};

fn main() {
    let device_id = std::env::args()
        .nth(1)
        .and_then(|raw| raw.parse::<i32>().ok())
        .unwrap_or(0);
    let mapping = to_provider_options(&TensorrtProviderInfo::for_device(device_id));

    println!("trt_ep_core version={}", trt_ep_core::core_version());
    match serde_json::to_string_pretty(&mapping) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("failed to render provider options: {err}"),
    }
}
