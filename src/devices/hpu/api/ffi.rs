#![allow(dead_code)]
#![allow(non_camel_case_types)]

use std::ffi::c_void;

/// Raw status code, decoded with [`SynStatus::from_raw`](super::SynStatus::from_raw).
pub type synStatus = u32;
pub type synDeviceId = u32;

pub enum synSectionHandle_t {}
pub type synSectionHandle = *mut synSectionHandle_t;

pub enum synStreamHandle_t {}
pub type synStreamHandle = *mut synStreamHandle_t;

#[link(name = "Synapse")]
unsafe extern "C" {
    pub fn synHostMap(deviceId: synDeviceId, size: u64, buffer: *const c_void) -> synStatus;
    pub fn synHostUnmap(deviceId: synDeviceId, buffer: *const c_void) -> synStatus;
    pub fn synDeviceMalloc(
        deviceId: synDeviceId,
        size: u64,
        reqAddr: u64,
        flags: u32,
        buffer: *mut u64,
    ) -> synStatus;
    pub fn synDeviceFree(deviceId: synDeviceId, buffer: u64, flags: u32) -> synStatus;
    pub fn synSectionDestroy(sectionHandle: synSectionHandle) -> synStatus;
}
