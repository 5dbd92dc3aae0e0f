use trt_ep_core::{
    tensorrt_kernel_defs, InMemoryKernelRegistry, KernelDef, KernelRegistry, LifecycleError,
    LifecycleState, RegistryLifecycle, ONNX_DOMAIN, TENSORRT_PROVIDER_TYPE,
};

#[test]
fn initialize_registers_tensorrt_kernels_into_shared_registry() {
    let mut registry = InMemoryKernelRegistry::new();
    registry
        .register(KernelDef::new(
            "MemcpyFromHost",
            ONNX_DOMAIN,
            1,
            "CUDAExecutionProvider",
        ))
        .expect("foreign kernel registers");

    let mut lifecycle = RegistryLifecycle::new();
    lifecycle.initialize(&mut registry).unwrap();

    let ours = registry.list_by_provider(TENSORRT_PROVIDER_TYPE);
    assert_eq!(ours.len(), tensorrt_kernel_defs().len());
    assert!(ours.iter().any(|kernel| kernel.op_type == "MemcpyToHost"));
    assert_eq!(registry.len(), ours.len() + 1);
}

#[test]
fn shutdown_leaves_foreign_entries_untouched() {
    let mut registry = InMemoryKernelRegistry::new();
    registry
        .register(KernelDef::new("Relu", ONNX_DOMAIN, 14, "CUDAExecutionProvider"))
        .expect("foreign kernel registers");

    let mut lifecycle = RegistryLifecycle::new();
    lifecycle.initialize(&mut registry).unwrap();
    lifecycle.shutdown(&mut registry).unwrap();

    assert_eq!(lifecycle.state(), LifecycleState::ShutDown);
    assert_eq!(registry.len(), 1);
    assert!(registry.list_by_provider(TENSORRT_PROVIDER_TYPE).is_empty());
}

#[test]
fn initialize_fails_when_kernels_are_already_present() {
    let mut registry = InMemoryKernelRegistry::new();
    let mut first = RegistryLifecycle::new();
    first.initialize(&mut registry).unwrap();

    let mut second = RegistryLifecycle::new();
    let err = second
        .initialize(&mut registry)
        .expect_err("duplicate kernels must be rejected");
    assert!(matches!(err, LifecycleError::Registry(_)));
    assert_eq!(second.state(), LifecycleState::Uninitialized);
    assert_eq!(
        registry.list_by_provider(TENSORRT_PROVIDER_TYPE).len(),
        tensorrt_kernel_defs().len()
    );
}

#[test]
fn shutdown_tolerates_entries_removed_externally() {
    let mut registry = InMemoryKernelRegistry::new();
    let mut lifecycle = RegistryLifecycle::new();
    lifecycle.initialize(&mut registry).unwrap();

    let key = lifecycle.registered_keys()[0].clone();
    registry.unregister(&key).unwrap();

    lifecycle.shutdown(&mut registry).unwrap();
    assert!(registry.is_empty());
    assert_eq!(lifecycle.state(), LifecycleState::ShutDown);
}
