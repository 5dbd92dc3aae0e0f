//! Constructed TensorRT backend component.

use crate::model::provider_info::{TensorrtProviderInfo, TENSORRT_PROVIDER_TYPE};
use uuid::Uuid;

/// Stable identifier for one constructed provider instance.
pub type ProviderInstanceId = Uuid;

/// Contract for provider instances handed back to the host.
///
/// Everything past construction belongs to the execution engine.
pub trait ExecutionProvider: Send + Sync {
    fn provider_type(&self) -> &str;
    fn instance_id(&self) -> ProviderInstanceId;
    fn info(&self) -> &TensorrtProviderInfo;
}

/// TensorRT provider instance holding its own configuration copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorrtExecutionProvider {
    instance_id: ProviderInstanceId,
    info: TensorrtProviderInfo,
}

impl TensorrtExecutionProvider {
    /// Creates a provider with a freshly generated instance ID.
    pub fn new(info: TensorrtProviderInfo) -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            info,
        }
    }
}

impl ExecutionProvider for TensorrtExecutionProvider {
    fn provider_type(&self) -> &str {
        TENSORRT_PROVIDER_TYPE
    }

    fn instance_id(&self) -> ProviderInstanceId {
        self.instance_id
    }

    fn info(&self) -> &TensorrtProviderInfo {
        &self.info
    }
}
