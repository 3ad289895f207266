use hpu_registry::prelude::*;

#[cfg(feature = "host")]
#[test]
fn test_cache_hit_ignores_size() {
    let registry = DeviceRegistry::new(HostDevice::new());

    let first = registry.hbm_alloc(0, 512, "attn.qkv").unwrap();
    let second = registry.hbm_alloc(0, 8, "attn.qkv").unwrap();

    assert_eq!(first.addr, second.addr);
    assert_eq!(second.requested, 8);
    assert_eq!(registry.api().malloc_calls(), 1);
}

#[cfg(feature = "host")]
#[test]
fn test_aliases_resolve_to_primary() {
    let registry = DeviceRegistry::new(HostDevice::new());
    let alloc = registry.hbm_alloc(0, 512, "attn.qkv").unwrap();

    assert_eq!(registry.cached_addr("attn.qkv"), Some(alloc.addr));
    assert_eq!(registry.cached_addr("attn.qkv_wu"), Some(alloc.addr));
    assert_eq!(registry.cached_addr("attn.qkv_wu_out"), Some(alloc.addr));
    assert_eq!(registry.cache_key_count(), 3);
}

#[cfg(feature = "host")]
#[test]
fn test_free_keeps_stale_entry() {
    let registry = DeviceRegistry::new(HostDevice::new());
    let alloc = registry.hbm_alloc(0, 512, "attn.qkv").unwrap();

    unsafe { registry.hbm_free(0, alloc.addr, "attn.qkv") }.unwrap();
    assert_eq!(registry.cached_addr("attn.qkv"), Some(alloc.addr));

    let reused = registry.hbm_alloc(0, 512, "attn.qkv").unwrap();
    assert_eq!(reused.addr, alloc.addr);
    assert_eq!(reused.origin, AllocOrigin::Stale);
    assert_eq!(registry.api().malloc_calls(), 1);
    assert!(!registry.api().is_live(0, reused.addr));
}

#[cfg(feature = "host")]
#[test]
fn test_out_of_device_memory() {
    let registry = DeviceRegistry::new(HostDevice::with_capacity(1024));
    registry.hbm_alloc(0, 1000, "a").unwrap();

    let err = registry.hbm_alloc(0, 1000, "b").unwrap_err();
    assert_eq!(err.kind(), Some(&SynErrorKind::OutOfDeviceMemory));
    assert_eq!(registry.cached_addr("b"), None);
    assert_eq!(registry.cache_len(), 1);
}

#[cfg(feature = "host")]
#[test]
fn test_config_from_env() {
    use hpu_registry::{ALIAS_SUFFIXES_ENV, FREE_POLICY_ENV};

    unsafe {
        std::env::set_var(FREE_POLICY_ENV, "invalidate");
        std::env::set_var(ALIAS_SUFFIXES_ENV, "_grad, _m,");
    }
    let config = RegistryConfig::from_env().unwrap();
    unsafe {
        std::env::remove_var(FREE_POLICY_ENV);
        std::env::remove_var(ALIAS_SUFFIXES_ENV);
    }

    assert_eq!(config.free_policy, FreePolicy::Invalidate);
    assert_eq!(config.alias_suffixes, vec!["_grad".to_string(), "_m".to_string()]);

    let registry = DeviceRegistry::with_config(HostDevice::new(), config);
    let alloc = registry.hbm_alloc(0, 64, "w").unwrap();
    assert_eq!(registry.cached_addr("w_m"), Some(alloc.addr));

    unsafe { registry.hbm_free(0, alloc.addr, "w") }.unwrap();
    assert_eq!(registry.cached_addr("w_grad"), None);
}

#[cfg(feature = "host")]
#[test]
fn test_host_map_pass_through() {
    let registry = DeviceRegistry::new(HostDevice::new());
    let staging = vec![0f32; 256];
    let ptr = staging.as_ptr().cast();

    unsafe {
        registry.host_map(0, 1024, ptr).unwrap();
        assert!(registry.api().is_mapped(0, ptr));

        let err = registry.host_map(0, 1024, ptr).unwrap_err();
        assert_eq!(err.kind(), Some(&SynErrorKind::ObjectAlreadyInitialized));

        registry.host_unmap(0, ptr).unwrap();
        let err = registry.host_unmap(0, ptr).unwrap_err();
        assert_eq!(err.kind(), Some(&SynErrorKind::MappingNotFound));
    }
}
