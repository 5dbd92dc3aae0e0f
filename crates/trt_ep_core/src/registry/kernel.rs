//! Kernel registry capability and in-process implementation.

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default operator domain.
pub const ONNX_DOMAIN: &str = "ai.onnx";

/// One kernel declaration contributed by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelDef {
    pub op_type: String,
    pub domain: String,
    pub since_version: u32,
    pub provider_type: String,
}

impl KernelDef {
    pub fn new(
        op_type: impl Into<String>,
        domain: impl Into<String>,
        since_version: u32,
        provider_type: impl Into<String>,
    ) -> Self {
        Self {
            op_type: op_type.into(),
            domain: domain.into(),
            since_version,
            provider_type: provider_type.into(),
        }
    }

    /// Registry key identifying this declaration.
    pub fn key(&self) -> KernelKey {
        KernelKey(format!(
            "{}:{}:{}:{}",
            self.provider_type, self.domain, self.op_type, self.since_version
        ))
    }
}

/// Stable registry key, `provider:domain:op_type:since_version`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KernelKey(String);

impl KernelKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for KernelKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Process-wide kernel registry capability.
///
/// Passed explicitly into lifecycle hooks so callers can substitute fakes.
pub trait KernelRegistry {
    fn register(&mut self, kernel: KernelDef) -> Result<(), RegistryError>;
    fn unregister(&mut self, key: &KernelKey) -> Result<KernelDef, RegistryError>;
}

/// Kernel registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateKernel(KernelKey),
    KernelNotFound(KernelKey),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateKernel(key) => write!(f, "kernel already registered: {key}"),
            Self::KernelNotFound(key) => write!(f, "kernel not registered: {key}"),
        }
    }
}

impl Error for RegistryError {}

/// In-process kernel registry.
#[derive(Debug, Default)]
pub struct InMemoryKernelRegistry {
    entries: BTreeMap<KernelKey, KernelDef>,
    provider_index: BTreeMap<String, BTreeSet<KernelKey>>,
}

impl InMemoryKernelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &KernelKey) -> Option<&KernelDef> {
        self.entries.get(key)
    }

    pub fn list_by_provider(&self, provider_type: &str) -> Vec<&KernelDef> {
        let Some(keys) = self.provider_index.get(provider_type) else {
            return vec![];
        };
        keys.iter().filter_map(|key| self.entries.get(key)).collect()
    }
}

impl KernelRegistry for InMemoryKernelRegistry {
    fn register(&mut self, kernel: KernelDef) -> Result<(), RegistryError> {
        let key = kernel.key();
        if self.entries.contains_key(&key) {
            return Err(RegistryError::DuplicateKernel(key));
        }

        self.provider_index
            .entry(kernel.provider_type.clone())
            .or_default()
            .insert(key.clone());
        self.entries.insert(key, kernel);
        Ok(())
    }

    fn unregister(&mut self, key: &KernelKey) -> Result<KernelDef, RegistryError> {
        let kernel = self
            .entries
            .remove(key)
            .ok_or_else(|| RegistryError::KernelNotFound(key.clone()))?;

        if let Some(keys) = self.provider_index.get_mut(&kernel.provider_type) {
            keys.remove(key);
            if keys.is_empty() {
                self.provider_index.remove(&kernel.provider_type);
            }
        }
        Ok(kernel)
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryKernelRegistry, KernelDef, KernelRegistry, RegistryError, ONNX_DOMAIN};

    fn memcpy_kernel(op_type: &str) -> KernelDef {
        KernelDef::new(op_type, ONNX_DOMAIN, 1, "TensorrtExecutionProvider")
    }

    #[test]
    fn registers_and_indexes_by_provider() {
        let mut registry = InMemoryKernelRegistry::new();
        registry
            .register(memcpy_kernel("MemcpyFromHost"))
            .expect("first kernel registers");
        registry
            .register(memcpy_kernel("MemcpyToHost"))
            .expect("second kernel registers");

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.list_by_provider("TensorrtExecutionProvider").len(),
            2
        );
        assert!(registry.list_by_provider("CUDAExecutionProvider").is_empty());
    }

    #[test]
    fn rejects_duplicate_kernel() {
        let mut registry = InMemoryKernelRegistry::new();
        registry
            .register(memcpy_kernel("MemcpyFromHost"))
            .expect("first registration should succeed");
        let err = registry
            .register(memcpy_kernel("MemcpyFromHost"))
            .expect_err("duplicate registration must fail");
        assert!(matches!(err, RegistryError::DuplicateKernel(_)));
    }

    #[test]
    fn unregister_removes_entry_and_index() {
        let mut registry = InMemoryKernelRegistry::new();
        let kernel = memcpy_kernel("MemcpyToHost");
        let key = kernel.key();
        registry.register(kernel.clone()).expect("register");

        let removed = registry.unregister(&key).expect("unregister");
        assert_eq!(removed, kernel);
        assert!(registry.is_empty());
        assert!(registry
            .list_by_provider("TensorrtExecutionProvider")
            .is_empty());

        let err = registry
            .unregister(&key)
            .expect_err("second unregister must fail");
        assert_eq!(err, RegistryError::KernelNotFound(key));
    }

    #[test]
    fn key_encodes_provider_domain_op_and_version() {
        let key = memcpy_kernel("MemcpyFromHost").key();
        assert_eq!(
            key.as_str(),
            "TensorrtExecutionProvider:ai.onnx:MemcpyFromHost:1"
        );
    }
}
