use std::sync::Arc;

use hpu_registry::{
    prelude::*,
    static_api::{self, entry_points},
};

// The static registry is process-wide, so the whole lifecycle runs in one test.
#[cfg(all(feature = "host", feature = "static-api"))]
#[test]
fn test_static_lifecycle() {
    let mut addr = 0;
    assert_eq!(
        entry_points::hbm_alloc(0, 64, &mut addr, "w"),
        SynStatus::synUninitialized
    );
    assert!(static_api::shutdown().is_err());

    let device = Arc::new(HostDevice::new());
    let registry = static_api::install(device.clone(), RegistryConfig::default()).unwrap();
    let err = static_api::install(HostDevice::new(), RegistryConfig::default()).unwrap_err();
    assert_eq!(err.kind(), Some(&DeviceError::RegistryInstalled));
    assert!(static_api::is_installed());

    assert_eq!(entry_points::hbm_alloc(0, 64, &mut addr, "w"), SynStatus::synSuccess);
    assert_ne!(addr, 0);

    let mut alias_addr = 0;
    assert_eq!(
        entry_points::hbm_alloc(0, 4, &mut alias_addr, "w_wu"),
        SynStatus::synSuccess
    );
    assert_eq!(alias_addr, addr);

    let mut untouched = 7;
    assert_eq!(
        entry_points::hbm_alloc(0, 0, &mut untouched, "empty"),
        SynStatus::synInvalidArgument
    );
    assert_eq!(untouched, 7);

    unsafe {
        assert_eq!(entry_points::hbm_free(0, addr, "w"), SynStatus::synSuccess);
        assert_eq!(
            entry_points::hbm_free(0, addr, "w"),
            SynStatus::synFailedToFreeDeviceMemory
        );
    }

    let staging = [0u8; 16];
    unsafe {
        assert_eq!(
            entry_points::host_map(0, 16, staging.as_ptr().cast()),
            SynStatus::synSuccess
        );
        assert_eq!(
            entry_points::host_unmap(0, staging.as_ptr().cast()),
            SynStatus::synSuccess
        );
    }

    let section = device.create_section();
    unsafe { static_api::static_registry().unwrap().add_section("s", section, true) };
    entry_points::reset_tensor_sections();
    assert_eq!(device.destroyed_sections(), vec![section]);
    assert_eq!(registry.section_count(), 0);
    assert_eq!(device.malloc_calls(), 2);

    drop(registry);
    static_api::shutdown().unwrap();
    assert!(!static_api::is_installed());

    // shutting down while a handle is still held
    let device = Arc::new(HostDevice::new());
    let registry = static_api::install(device.clone(), RegistryConfig::default()).unwrap();
    let section = device.create_section();
    unsafe { registry.add_section("s", section, true) };
    registry.set_stream(0, StreamHandle(1));
    assert_eq!(entry_points::hbm_alloc(0, 64, &mut addr, "w"), SynStatus::synSuccess);

    static_api::shutdown().unwrap();
    assert!(!static_api::is_installed());
    assert_eq!(device.destroyed_sections(), vec![section]);
    assert_eq!(registry.section_count(), 0);
    assert_eq!(registry.cache_key_count(), 0);
    assert_eq!(registry.stream(0), None);
    assert_eq!(
        entry_points::hbm_alloc(0, 64, &mut addr, "w"),
        SynStatus::synUninitialized
    );
}
