//! Synapse API

mod error;
#[cfg(feature = "synapse")]
mod ffi;
#[cfg(feature = "synapse")]
mod synapse;

pub use error::*;
#[cfg(feature = "synapse")]
pub use ffi::*;
#[cfg(feature = "synapse")]
pub use synapse::*;
