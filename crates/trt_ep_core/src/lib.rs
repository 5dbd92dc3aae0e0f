//! Core domain logic for the TensorRT provider adapter.
//! This crate owns configuration, factory, and registry lifecycle semantics;
//! the ABI boundary lives in `trt_ep_ffi`.

pub mod logging;
pub mod model;
pub mod options;
pub mod provider;
pub mod registry;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::provider_info::{ComputeStreamHandle, TensorrtProviderInfo, TENSORRT_PROVIDER_TYPE};
pub use options::mapping::{
    from_provider_options, supported_option_keys, to_provider_options, OptionsError,
    ProviderOptions,
};
pub use provider::execution_provider::{
    ExecutionProvider, ProviderInstanceId, TensorrtExecutionProvider,
};
pub use provider::factory::{ExecutionProviderFactory, TensorrtProviderFactory};
pub use registry::kernel::{
    InMemoryKernelRegistry, KernelDef, KernelKey, KernelRegistry, RegistryError, ONNX_DOMAIN,
};
pub use registry::lifecycle::{
    tensorrt_kernel_defs, LifecycleError, LifecycleState, RegistryLifecycle,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
