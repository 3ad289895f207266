use std::ffi::c_void;

use super::{
    error::{SynResult, SynStatus},
    ffi::{
        synDeviceFree, synDeviceId, synDeviceMalloc, synHostMap, synHostUnmap, synSectionDestroy,
        synSectionHandle,
    },
};

/// Pins `size` bytes of host memory at `buffer` for DMA by the device.
/// # Safety
/// FFI, `buffer` must point to at least `size` bytes that outlive the mapping.
pub unsafe fn syn_host_map(device_id: synDeviceId, size: u64, buffer: *const c_void) -> SynResult<()> {
    SynStatus::from_raw(unsafe { synHostMap(device_id, size, buffer) })
}

/// # Safety
/// FFI, `buffer` must have been mapped with [`syn_host_map`].
pub unsafe fn syn_host_unmap(device_id: synDeviceId, buffer: *const c_void) -> SynResult<()> {
    SynStatus::from_raw(unsafe { synHostUnmap(device_id, buffer) })
}

/// Allocates `size` bytes of HBM. The requested address and the flags are left at zero.
pub fn syn_device_malloc(device_id: synDeviceId, size: u64) -> SynResult<u64> {
    let mut addr = 0;
    SynStatus::from_raw(unsafe { synDeviceMalloc(device_id, size, 0, 0, &mut addr) })?;
    Ok(addr)
}

/// Free HBM allocated with [`syn_device_malloc`].
/// # Safety
/// FFI, `addr` must be a live device allocation.
pub unsafe fn syn_device_free(device_id: synDeviceId, addr: u64) -> SynResult<()> {
    SynStatus::from_raw(unsafe { synDeviceFree(device_id, addr, 0) })
}

/// # Safety
/// FFI, `section` must be a valid handle that was not destroyed before.
pub unsafe fn syn_section_destroy(section: synSectionHandle) -> SynResult<()> {
    SynStatus::from_raw(unsafe { synSectionDestroy(section) })
}
