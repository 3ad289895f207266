use core::ffi::c_void;

use super::api::{
    SynResult, synSectionHandle, syn_device_free, syn_device_malloc, syn_host_map,
    syn_host_unmap, syn_section_destroy,
};
use crate::{DeviceAddr, DeviceApi, DeviceId, SectionHandle};

/// [`DeviceApi`] backed by libSynapse.
#[derive(Debug, Default, Clone, Copy)]
pub struct Synapse;

impl DeviceApi for Synapse {
    #[inline]
    unsafe fn host_map(
        &self,
        device_id: DeviceId,
        size: u64,
        buffer: *const c_void,
    ) -> SynResult<()> {
        unsafe { syn_host_map(device_id, size, buffer) }
    }

    #[inline]
    unsafe fn host_unmap(&self, device_id: DeviceId, buffer: *const c_void) -> SynResult<()> {
        unsafe { syn_host_unmap(device_id, buffer) }
    }

    #[inline]
    fn device_malloc(&self, device_id: DeviceId, size: u64) -> SynResult<DeviceAddr> {
        syn_device_malloc(device_id, size)
    }

    #[inline]
    unsafe fn device_free(&self, device_id: DeviceId, addr: DeviceAddr) -> SynResult<()> {
        unsafe { syn_device_free(device_id, addr) }
    }

    #[inline]
    unsafe fn section_destroy(&self, section: SectionHandle) -> SynResult<()> {
        unsafe { syn_section_destroy(section.0 as synSectionHandle) }
    }
}

impl From<synSectionHandle> for SectionHandle {
    #[inline]
    fn from(handle: synSectionHandle) -> Self {
        SectionHandle(handle as usize)
    }
}
