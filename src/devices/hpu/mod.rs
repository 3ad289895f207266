//! The Synapse (Habana Gaudi) backend.
//! The status types are always available, the bindings need the `synapse` feature.

pub mod api;

#[cfg(feature = "synapse")]
mod hpu_device;

pub use api::{SynErrorKind, SynResult, SynStatus};
#[cfg(feature = "synapse")]
pub use hpu_device::*;
