//! Process-wide adapter object the host drives.
//!
//! # Responsibility
//! - Build provider factories from the device-only or fully specified path.
//! - Serve option update/read requests for host tooling.
//! - Run registry init/teardown against an explicitly passed registry.
//!
//! # Invariants
//! - Factories are shared (`Arc`) and immutable after construction.
//! - Factory construction never consults lifecycle state.
//! - Lifecycle state is serialized behind a mutex so the singleton stays `Sync`.

use crate::abi::{legacy_defaulted_keys, OrtTensorRTProviderOptionsV2};
use crate::translate::{update_external, ExternalOptions, OptionsVersion};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use trt_ep_core::{
    from_provider_options, to_provider_options, InMemoryKernelRegistry, KernelRegistry,
    LifecycleError, LifecycleState, OptionsError, ProviderOptions, RegistryLifecycle,
    TensorrtProviderFactory,
};

static PROVIDER: OnceLock<TensorrtProvider> = OnceLock::new();
static KERNEL_REGISTRY: OnceLock<Mutex<InMemoryKernelRegistry>> = OnceLock::new();

/// Returns the process-wide adapter.
pub fn provider() -> &'static TensorrtProvider {
    PROVIDER.get_or_init(TensorrtProvider::new)
}

/// Returns the process-wide kernel registry used by the exported hooks.
pub fn process_kernel_registry() -> &'static Mutex<InMemoryKernelRegistry> {
    KERNEL_REGISTRY.get_or_init(|| Mutex::new(InMemoryKernelRegistry::new()))
}

/// TensorRT adapter exposing factory construction, options, and lifecycle.
#[derive(Debug, Default)]
pub struct TensorrtProvider {
    lifecycle: Mutex<RegistryLifecycle>,
}

impl TensorrtProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimal path: only the device is set and `has_trt_options` is `false`.
    pub fn create_factory_for_device(&self, device_id: i32) -> Arc<TensorrtProviderFactory> {
        info!(
            "event=factory_create module=provider status=ok path=device device_id={device_id}"
        );
        Arc::new(TensorrtProviderFactory::for_device(device_id))
    }

    /// Fully specified path: every field comes from `options`.
    ///
    /// # Safety
    ///
    /// Every non-null string pointer in `options` must reference a valid
    /// NUL-terminated buffer for the duration of the call.
    pub unsafe fn create_factory(&self, options: ExternalOptions<'_>) -> Arc<TensorrtProviderFactory> {
        // SAFETY: forwarded caller guarantee.
        let info = unsafe { options.to_info() };
        info!(
            "event=factory_create module=provider status=ok path=options version={:?} device_id={} engine_cache_path_set={} calibration_table_set={}",
            options.version(),
            info.device_id,
            !info.engine_cache_path.is_empty(),
            !info.int8_calibration_table_name.is_empty()
        );
        Arc::new(TensorrtProviderFactory::with_options(info))
    }

    /// Parses `options` and overwrites `out` with the result.
    ///
    /// New string buffers in `out` belong to the caller; previously held
    /// pointers are overwritten without release. The host's compute stream in
    /// `out` is kept; stream keys in `options` are ignored. `out` is untouched
    /// on error.
    ///
    /// # Errors
    /// - `OptionsError::InvalidValue` for an unparsable known key.
    pub fn update_provider_options(
        &self,
        out: &mut OrtTensorRTProviderOptionsV2,
        options: &ProviderOptions,
    ) -> Result<(), OptionsError> {
        let info = match from_provider_options(options) {
            Ok(info) => info,
            Err(err) => {
                warn!(
                    "event=options_update module=provider status=error error_code=invalid_value error={err}"
                );
                return Err(err);
            }
        };
        update_external(&info, out);
        debug!(
            "event=options_update module=provider status=ok keys={}",
            options.len()
        );
        Ok(())
    }

    /// Converts external options to the generic mapping.
    ///
    /// # Safety
    ///
    /// Every non-null string pointer in `options` must reference a valid
    /// NUL-terminated buffer for the duration of the call.
    pub unsafe fn get_provider_options(&self, options: ExternalOptions<'_>) -> ProviderOptions {
        // SAFETY: forwarded caller guarantee.
        let info = unsafe { options.to_info() };
        if options.version() == OptionsVersion::Legacy {
            for key in legacy_defaulted_keys() {
                debug!("event=options_read module=provider status=defaulted key={key}");
            }
        }
        to_provider_options(&info)
    }

    /// Registers backend kernels into `registry`.
    ///
    /// # Errors
    /// - Forwards lifecycle transition and registry errors.
    pub fn initialize(&self, registry: &mut dyn KernelRegistry) -> Result<(), LifecycleError> {
        self.lock_lifecycle().initialize(registry)
    }

    /// Unregisters backend kernels from `registry`.
    ///
    /// Every provider built by this adapter's factories should be dropped first.
    ///
    /// # Errors
    /// - Forwards lifecycle transition errors.
    pub fn shutdown(&self, registry: &mut dyn KernelRegistry) -> Result<(), LifecycleError> {
        self.lock_lifecycle().shutdown(registry)
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lock_lifecycle().state()
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, RegistryLifecycle> {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
