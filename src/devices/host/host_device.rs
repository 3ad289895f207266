use core::ffi::c_void;
use std::collections::HashMap;

use parking_lot::Mutex;

use crate::{
    DeviceAddr, DeviceApi, DeviceId, SectionHandle,
    hpu::{SynErrorKind, SynResult},
};

/// First address handed out by a [`HostDevice`].
pub const HOST_HBM_BASE: DeviceAddr = 0x1000_0000;
/// Allocations of a [`HostDevice`] are aligned to this many bytes.
pub const HOST_HBM_ALIGN: u64 = 128;

#[derive(Debug, Default)]
struct HostState {
    next_addr: DeviceAddr,
    next_section: usize,
    allocations: HashMap<(DeviceId, DeviceAddr), u64>,
    mapped: HashMap<(DeviceId, usize), u64>,
    destroyed: Vec<SectionHandle>,
    malloc_calls: usize,
    free_calls: usize,
    fail_next_malloc: Option<SynErrorKind>,
    failing_sections: HashMap<SectionHandle, SynErrorKind>,
}

/// A [`DeviceApi`] that simulates HBM bookkeeping in host memory.
///
/// Addresses are never dereferenced. The device keeps track of live allocations, host
/// mappings and destroyed sections, and failures can be injected, which makes it the
/// backend used for tests and CPU-only runs.
#[derive(Debug)]
pub struct HostDevice {
    capacity: Option<u64>,
    state: Mutex<HostState>,
}

impl Default for HostDevice {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl HostDevice {
    #[inline]
    pub fn new() -> Self {
        HostDevice {
            capacity: None,
            state: Mutex::new(HostState {
                next_addr: HOST_HBM_BASE,
                next_section: 1,
                ..Default::default()
            }),
        }
    }

    /// Creates a device that reports `OutOfDeviceMemory` once more than `bytes` are allocated.
    pub fn with_capacity(bytes: u64) -> Self {
        HostDevice {
            capacity: Some(bytes),
            ..Self::new()
        }
    }

    /// Hands out a fresh section handle, as the SDK does when a section is created.
    pub fn create_section(&self) -> SectionHandle {
        let mut state = self.state.lock();
        let handle = SectionHandle(state.next_section);
        state.next_section += 1;
        handle
    }

    /// The next call to [`DeviceApi::device_malloc`] fails with `kind`.
    pub fn fail_next_malloc(&self, kind: SynErrorKind) {
        self.state.lock().fail_next_malloc = Some(kind);
    }

    /// Every destroy of `section` fails with `kind`.
    pub fn fail_section_destroy(&self, section: SectionHandle, kind: SynErrorKind) {
        self.state.lock().failing_sections.insert(section, kind);
    }

    #[inline]
    pub fn malloc_calls(&self) -> usize {
        self.state.lock().malloc_calls
    }

    #[inline]
    pub fn free_calls(&self) -> usize {
        self.state.lock().free_calls
    }

    /// Successfully destroyed sections, in destruction order.
    pub fn destroyed_sections(&self) -> Vec<SectionHandle> {
        self.state.lock().destroyed.clone()
    }

    pub fn is_live(&self, device_id: DeviceId, addr: DeviceAddr) -> bool {
        self.state.lock().allocations.contains_key(&(device_id, addr))
    }

    pub fn is_mapped(&self, device_id: DeviceId, buffer: *const c_void) -> bool {
        self.state
            .lock()
            .mapped
            .contains_key(&(device_id, buffer as usize))
    }

    /// Sum of the sizes of all live allocations.
    pub fn allocated_bytes(&self) -> u64 {
        self.state.lock().allocations.values().sum()
    }
}

impl DeviceApi for HostDevice {
    unsafe fn host_map(
        &self,
        device_id: DeviceId,
        size: u64,
        buffer: *const c_void,
    ) -> SynResult<()> {
        if buffer.is_null() || size == 0 {
            return Err(SynErrorKind::InvalidArgument);
        }
        let mut state = self.state.lock();
        if state.mapped.contains_key(&(device_id, buffer as usize)) {
            return Err(SynErrorKind::ObjectAlreadyInitialized);
        }
        state.mapped.insert((device_id, buffer as usize), size);
        Ok(())
    }

    unsafe fn host_unmap(&self, device_id: DeviceId, buffer: *const c_void) -> SynResult<()> {
        self.state
            .lock()
            .mapped
            .remove(&(device_id, buffer as usize))
            .map(|_| ())
            .ok_or(SynErrorKind::MappingNotFound)
    }

    fn device_malloc(&self, device_id: DeviceId, size: u64) -> SynResult<DeviceAddr> {
        let mut state = self.state.lock();
        state.malloc_calls += 1;

        if let Some(kind) = state.fail_next_malloc.take() {
            return Err(kind);
        }
        if size == 0 {
            return Err(SynErrorKind::InvalidArgument);
        }
        if let Some(capacity) = self.capacity {
            let allocated: u64 = state.allocations.values().sum();
            if allocated.saturating_add(size) > capacity {
                return Err(SynErrorKind::OutOfDeviceMemory);
            }
        }

        let addr = state.next_addr;
        let padded = size.div_ceil(HOST_HBM_ALIGN) * HOST_HBM_ALIGN;
        state.next_addr = addr
            .checked_add(padded)
            .ok_or(SynErrorKind::OutOfDeviceMemory)?;
        state.allocations.insert((device_id, addr), size);
        Ok(addr)
    }

    unsafe fn device_free(&self, device_id: DeviceId, addr: DeviceAddr) -> SynResult<()> {
        let mut state = self.state.lock();
        state.free_calls += 1;
        state
            .allocations
            .remove(&(device_id, addr))
            .map(|_| ())
            .ok_or(SynErrorKind::FailedToFreeDeviceMemory)
    }

    unsafe fn section_destroy(&self, section: SectionHandle) -> SynResult<()> {
        let mut state = self.state.lock();
        if let Some(kind) = state.failing_sections.get(&section) {
            return Err(*kind);
        }
        if state.destroyed.contains(&section) {
            return Err(SynErrorKind::InvalidArgument);
        }
        state.destroyed.push(section);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{HOST_HBM_ALIGN, HOST_HBM_BASE, HostDevice};
    use crate::{DeviceApi, hpu::SynErrorKind};

    #[test]
    fn test_host_malloc_aligned_and_distinct() {
        let device = HostDevice::new();
        let a = device.device_malloc(0, 10).unwrap();
        let b = device.device_malloc(0, 10).unwrap();
        assert_eq!(a, HOST_HBM_BASE);
        assert_eq!(b, HOST_HBM_BASE + HOST_HBM_ALIGN);
        assert_eq!(device.allocated_bytes(), 20);
        assert_eq!(device.malloc_calls(), 2);
    }

    #[test]
    fn test_host_malloc_zero_size() {
        let device = HostDevice::new();
        assert_eq!(device.device_malloc(0, 0), Err(SynErrorKind::InvalidArgument));
    }

    #[test]
    fn test_host_capacity() {
        let device = HostDevice::with_capacity(100);
        device.device_malloc(0, 60).unwrap();
        assert_eq!(
            device.device_malloc(0, 60),
            Err(SynErrorKind::OutOfDeviceMemory)
        );
    }

    #[test]
    fn test_host_free_twice() {
        let device = HostDevice::new();
        let addr = device.device_malloc(1, 64).unwrap();
        assert!(device.is_live(1, addr));
        unsafe {
            device.device_free(1, addr).unwrap();
            assert_eq!(
                device.device_free(1, addr),
                Err(SynErrorKind::FailedToFreeDeviceMemory)
            );
        }
        assert!(!device.is_live(1, addr));
        assert_eq!(device.free_calls(), 2);
    }

    #[test]
    fn test_host_map_unmap() {
        let device = HostDevice::new();
        let data = vec![0u8; 32];
        let ptr = data.as_ptr().cast();
        unsafe {
            device.host_map(0, 32, ptr).unwrap();
            assert!(device.is_mapped(0, ptr));
            device.host_unmap(0, ptr).unwrap();
            assert_eq!(
                device.host_unmap(0, ptr),
                Err(SynErrorKind::MappingNotFound)
            );
        }
    }

    #[test]
    fn test_host_section_destroy() {
        let device = HostDevice::new();
        let section = device.create_section();
        unsafe {
            device.section_destroy(section).unwrap();
            assert_eq!(
                device.section_destroy(section),
                Err(SynErrorKind::InvalidArgument)
            );
        }
        assert_eq!(device.destroyed_sections(), vec![section]);
    }
}
