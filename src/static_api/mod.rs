//! A process-wide registry for device backends that can only call free functions.
//!
//! The registry is installed once when the backend is initialized and removed by [`shutdown`].
//! In between, [`entry_points`] forwards every call to it.

pub mod entry_points;
mod static_registry;

pub use static_registry::*;
