//! A host memory simulation of the SDK.

mod host_device;

pub use host_device::*;
