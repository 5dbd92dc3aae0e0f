//! Registry lifecycle hooks for the TensorRT backend.
//!
//! # Responsibility
//! - Register backend kernels on `initialize` and remove them on `shutdown`.
//! - Track the `Uninitialized -> Initialized -> ShutDown` state machine.
//!
//! # Invariants
//! - `ShutDown` is terminal.
//! - `shutdown` unregisters exactly the keys `initialize` registered.
//! - A failed `initialize` rolls back partial registrations and stays
//!   `Uninitialized`.
//! - Provider construction does not consult this state.

use crate::model::provider_info::TENSORRT_PROVIDER_TYPE;
use crate::registry::kernel::{KernelDef, KernelKey, KernelRegistry, RegistryError, ONNX_DOMAIN};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lifecycle state of the backend's registry entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    ShutDown,
}

impl LifecycleState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::ShutDown => "shut_down",
        }
    }
}

/// Lifecycle transition errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    InvalidTransition {
        from: LifecycleState,
        action: &'static str,
    },
    Registry(RegistryError),
}

impl Display for LifecycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { from, action } => {
                write!(f, "cannot {action} from lifecycle state {}", from.as_str())
            }
            Self::Registry(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LifecycleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTransition { .. } => None,
            Self::Registry(err) => Some(err),
        }
    }
}

impl From<RegistryError> for LifecycleError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

/// Kernels the TensorRT backend contributes to the process-wide registry.
pub fn tensorrt_kernel_defs() -> Vec<KernelDef> {
    ["MemcpyFromHost", "MemcpyToHost"]
        .into_iter()
        .map(|op_type| KernelDef::new(op_type, ONNX_DOMAIN, 1, TENSORRT_PROVIDER_TYPE))
        .collect()
}

/// Init/teardown state machine around the backend's registry entries.
#[derive(Debug)]
pub struct RegistryLifecycle {
    state: LifecycleState,
    kernels: Vec<KernelDef>,
    registered: Vec<KernelKey>,
}

impl Default for RegistryLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryLifecycle {
    pub fn new() -> Self {
        Self::with_kernels(tensorrt_kernel_defs())
    }

    pub fn with_kernels(kernels: Vec<KernelDef>) -> Self {
        Self {
            state: LifecycleState::Uninitialized,
            kernels,
            registered: Vec::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Keys currently owned by this lifecycle in the registry.
    pub fn registered_keys(&self) -> &[KernelKey] {
        &self.registered
    }

    /// Registers backend kernels: `Uninitialized -> Initialized`.
    ///
    /// # Errors
    /// - `InvalidTransition` when not `Uninitialized`.
    /// - `Registry` when the registry rejects a kernel; earlier registrations
    ///   from this call are removed again.
    pub fn initialize(&mut self, registry: &mut dyn KernelRegistry) -> Result<(), LifecycleError> {
        if self.state != LifecycleState::Uninitialized {
            warn!(
                "event=registry_init module=registry status=error error_code=invalid_transition state={}",
                self.state.as_str()
            );
            return Err(LifecycleError::InvalidTransition {
                from: self.state,
                action: "initialize",
            });
        }

        for kernel in self.kernels.clone() {
            let key = kernel.key();
            if let Err(err) = registry.register(kernel) {
                error!(
                    "event=registry_init module=registry status=error error_code=register_failed kernel={} error={}",
                    key, err
                );
                self.rollback(registry);
                return Err(err.into());
            }
            self.registered.push(key);
        }

        self.state = LifecycleState::Initialized;
        info!(
            "event=registry_init module=registry status=ok kernels={}",
            self.registered.len()
        );
        Ok(())
    }

    /// Unregisters backend kernels: `Initialized -> ShutDown`.
    ///
    /// Entries already missing from the registry are logged and skipped.
    ///
    /// # Errors
    /// - `InvalidTransition` when not `Initialized`.
    pub fn shutdown(&mut self, registry: &mut dyn KernelRegistry) -> Result<(), LifecycleError> {
        if self.state != LifecycleState::Initialized {
            warn!(
                "event=registry_shutdown module=registry status=error error_code=invalid_transition state={}",
                self.state.as_str()
            );
            return Err(LifecycleError::InvalidTransition {
                from: self.state,
                action: "shutdown",
            });
        }

        let total = self.registered.len();
        for key in self.registered.drain(..) {
            if let Err(err) = registry.unregister(&key) {
                warn!(
                    "event=registry_shutdown module=registry status=degraded kernel={} error={}",
                    key, err
                );
            }
        }

        self.state = LifecycleState::ShutDown;
        info!("event=registry_shutdown module=registry status=ok kernels={total}");
        Ok(())
    }

    fn rollback(&mut self, registry: &mut dyn KernelRegistry) {
        for key in self.registered.drain(..).rev() {
            if let Err(err) = registry.unregister(&key) {
                warn!(
                    "event=registry_init module=registry status=degraded action=rollback kernel={} error={}",
                    key, err
                );
            }
        }
    }
}
