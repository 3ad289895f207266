//! Status code returning functions for the device backend plugin contract.
//! Each one forwards to the installed static registry.

use core::ffi::c_void;

use tracing::warn;

use super::static_registry;
use crate::{
    DeviceAddr, DeviceError, DeviceId, ErrorKind,
    hpu::{SynErrorKind, SynStatus},
};

/// Converts a registry result into the status handed to the plugin contract.
///
/// SDK statuses pass through unchanged, a missing registry is `synUninitialized`,
/// every other local error is `synFail`.
pub fn status_of<T>(result: crate::Result<T>) -> SynStatus {
    let err = match result {
        Ok(_) => return SynStatus::synSuccess,
        Err(err) => err,
    };
    if let Some(kind) = err.kind::<SynErrorKind>() {
        return kind.status();
    }
    if err.kind() == Some(&DeviceError::RegistryMissing) {
        return SynStatus::synUninitialized;
    }
    warn!(error = %err, "registry error reported as synFail");
    SynStatus::synFail
}

/// # Safety
/// See [`DeviceRegistry::host_map`](crate::DeviceRegistry::host_map).
pub unsafe fn host_map(device_id: DeviceId, size: u64, buffer: *const c_void) -> SynStatus {
    status_of(static_registry().and_then(|registry| unsafe { registry.host_map(device_id, size, buffer) }))
}

/// # Safety
/// See [`DeviceRegistry::host_unmap`](crate::DeviceRegistry::host_unmap).
pub unsafe fn host_unmap(device_id: DeviceId, buffer: *const c_void) -> SynStatus {
    status_of(static_registry().and_then(|registry| unsafe { registry.host_unmap(device_id, buffer) }))
}

/// Writes the address of the buffer `name` to `addr`. `addr` is untouched on failure.
pub fn hbm_alloc(device_id: DeviceId, size: u64, addr: &mut DeviceAddr, name: &str) -> SynStatus {
    let alloc = static_registry().and_then(|registry| registry.hbm_alloc(device_id, size, name));
    if let Ok(alloc) = &alloc {
        *addr = alloc.addr;
    }
    status_of(alloc)
}

/// # Safety
/// See [`DeviceRegistry::hbm_free`](crate::DeviceRegistry::hbm_free).
pub unsafe fn hbm_free(device_id: DeviceId, addr: DeviceAddr, name: &str) -> SynStatus {
    status_of(static_registry().and_then(|registry| unsafe { registry.hbm_free(device_id, addr, name) }))
}

/// Destroy failures are logged, the plugin contract has no way to report them.
pub fn reset_tensor_sections() {
    let reset = static_registry().and_then(|registry| registry.reset_tensor_sections());
    if let Err(err) = reset {
        warn!(error = %err, "reset tensor sections");
    }
}
