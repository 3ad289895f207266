//! The SDK seam: every call the registry makes into the accelerator goes through [`DeviceApi`].

use core::ffi::c_void;
use std::sync::Arc;

pub mod hpu;

#[cfg(feature = "host")]
pub mod host;

use hpu::SynResult;

/// Identifies one accelerator, as enumerated by the SDK.
pub type DeviceId = u32;

/// A device (HBM) address.
pub type DeviceAddr = u64;

/// Opaque handle of a device memory section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectionHandle(pub usize);

/// Opaque handle of a device stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamHandle(pub usize);

/// The subset of the accelerator SDK the registry depends on.
/// Implementations report failures as the SDK status, without translation.
pub trait DeviceApi {
    /// Pins `size` bytes of host memory starting at `buffer` for device `device_id`.
    /// # Safety
    /// `buffer` must point to at least `size` bytes that stay valid until [`DeviceApi::host_unmap`].
    unsafe fn host_map(&self, device_id: DeviceId, size: u64, buffer: *const c_void)
    -> SynResult<()>;

    /// # Safety
    /// `buffer` must have been mapped with [`DeviceApi::host_map`] on the same device.
    unsafe fn host_unmap(&self, device_id: DeviceId, buffer: *const c_void) -> SynResult<()>;

    /// Allocates `size` bytes of device memory and returns its address.
    fn device_malloc(&self, device_id: DeviceId, size: u64) -> SynResult<DeviceAddr>;

    /// # Safety
    /// `addr` must be a live allocation of this device. It must not be used afterwards.
    unsafe fn device_free(&self, device_id: DeviceId, addr: DeviceAddr) -> SynResult<()>;

    /// # Safety
    /// `section` must be a valid handle that was not destroyed before.
    unsafe fn section_destroy(&self, section: SectionHandle) -> SynResult<()>;
}

macro_rules! impl_device_api_for_ptr {
    ($($ptr:ty),*) => {
        $(
            impl<A: DeviceApi + ?Sized> DeviceApi for $ptr {
                #[inline]
                unsafe fn host_map(
                    &self,
                    device_id: DeviceId,
                    size: u64,
                    buffer: *const c_void,
                ) -> SynResult<()> {
                    unsafe { (**self).host_map(device_id, size, buffer) }
                }

                #[inline]
                unsafe fn host_unmap(&self, device_id: DeviceId, buffer: *const c_void) -> SynResult<()> {
                    unsafe { (**self).host_unmap(device_id, buffer) }
                }

                #[inline]
                fn device_malloc(&self, device_id: DeviceId, size: u64) -> SynResult<DeviceAddr> {
                    (**self).device_malloc(device_id, size)
                }

                #[inline]
                unsafe fn device_free(&self, device_id: DeviceId, addr: DeviceAddr) -> SynResult<()> {
                    unsafe { (**self).device_free(device_id, addr) }
                }

                #[inline]
                unsafe fn section_destroy(&self, section: SectionHandle) -> SynResult<()> {
                    unsafe { (**self).section_destroy(section) }
                }
            }
        )*
    };
}

impl_device_api_for_ptr!(&A, Box<A>, Arc<A>);
