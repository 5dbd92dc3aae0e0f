//! Provider factory capturing one configuration snapshot.
//!
//! # Responsibility
//! - Capture `TensorrtProviderInfo` by value at construction.
//! - Manufacture independent provider instances on demand.
//!
//! # Invariants
//! - Construction performs no I/O and no validation; it always succeeds.
//! - Stored configuration is immutable, so `create_provider` is safe to call
//!   concurrently through a shared reference.
//! - Registry lifecycle preconditions are the host's responsibility.

use crate::model::provider_info::TensorrtProviderInfo;
use crate::provider::execution_provider::{ExecutionProvider, TensorrtExecutionProvider};
use log::debug;

/// Factory contract consumed by the host.
pub trait ExecutionProviderFactory: Send + Sync {
    fn create_provider(&self) -> Box<dyn ExecutionProvider>;
}

/// Factory for TensorRT provider instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorrtProviderFactory {
    info: TensorrtProviderInfo,
}

impl TensorrtProviderFactory {
    pub fn new(info: TensorrtProviderInfo) -> Self {
        Self { info }
    }

    /// Minimal device-only construction path.
    pub fn for_device(device_id: i32) -> Self {
        Self::new(TensorrtProviderInfo::for_device(device_id))
    }

    /// Fully specified construction path; marks the snapshot as explicit.
    pub fn with_options(mut info: TensorrtProviderInfo) -> Self {
        info.has_trt_options = true;
        Self::new(info)
    }

    pub fn info(&self) -> &TensorrtProviderInfo {
        &self.info
    }

    pub fn has_extended_options(&self) -> bool {
        self.info.has_trt_options
    }

    /// Builds a concrete provider without boxing.
    pub fn create_tensorrt_provider(&self) -> TensorrtExecutionProvider {
        let provider = TensorrtExecutionProvider::new(self.info.clone());
        debug!(
            "event=provider_create module=factory status=ok device_id={} has_trt_options={} instance_id={}",
            self.info.device_id,
            self.info.has_trt_options,
            provider.instance_id()
        );
        provider
    }
}

impl ExecutionProviderFactory for TensorrtProviderFactory {
    fn create_provider(&self) -> Box<dyn ExecutionProvider> {
        Box::new(self.create_tensorrt_provider())
    }
}
