// #![warn(missing_docs)]

//! Device memory and section bookkeeping for an HPU device backend, written in Rust.
//! This crate sits between a framework's pluggable device backend and a Synapse-style accelerator SDK.
//!
//! On top of the SDK it adds:
//! - a name-keyed HBM allocation cache: allocating the same buffer name twice returns the same device address,
//!   and every buffer is reachable under its alias keys (`name_wu`, `name_wu_out` by default).
//! - a section registry: section handles are registered with a first-indication flag,
//!   [`DeviceRegistry::reset_tensor_sections`] destroys the owned ones and clears the registry.
//! - a stream map keyed by device id.
//!
//! The SDK is reached through [`DeviceApi`]. With the `synapse` feature, [`hpu::Synapse`] links against libSynapse,
//! the `host` feature provides [`host::HostDevice`], a host memory simulation.
//!
#![cfg_attr(feature = "host", doc = "```")]
#![cfg_attr(not(feature = "host"), doc = "```ignore")]
//! use hpu_registry::{host::HostDevice, AllocOrigin, DeviceRegistry};
//!
//! fn main() -> hpu_registry::Result<()> {
//!     let registry = DeviceRegistry::new(HostDevice::new());
//!
//!     let weights = registry.hbm_alloc(0, 4096, "fc1.weight")?;
//!     assert_eq!(weights.origin, AllocOrigin::Fresh);
//!
//!     // the size is not looked at once a buffer is cached
//!     let again = registry.hbm_alloc(0, 128, "fc1.weight_wu")?;
//!     assert_eq!(again.addr, weights.addr);
//!     assert_eq!(again.origin, AllocOrigin::Cached);
//!
//!     let section = registry.api().create_section();
//!     unsafe { registry.add_section("fc1", section, true) };
//!     assert_eq!(registry.reset_tensor_sections()?, 1);
//!
//!     registry.shutdown()
//! }
//! ```

pub use cache::*;
pub use devices::*;
pub use error::*;
pub use registry::*;

mod cache;
pub mod devices;
mod error;
pub mod flag;
mod registry;

#[cfg(feature = "serde")]
mod snapshot;
#[cfg(feature = "serde")]
pub use snapshot::*;

#[cfg(feature = "static-api")]
pub mod static_api;

pub mod prelude {
    //! Typical imports for using hpu-registry.

    pub use crate::{
        AllocOrigin, Allocation, DeviceAddr, DeviceApi, DeviceError, DeviceId, DeviceRegistry,
        Error, ErrorKind, RegistryConfig, SectionHandle, StreamHandle,
        flag::{FreePolicy, SectionFlag},
        hpu::{SynErrorKind, SynStatus},
    };

    #[cfg(feature = "host")]
    pub use crate::host::HostDevice;

    #[cfg(feature = "synapse")]
    pub use crate::hpu::Synapse;
}
