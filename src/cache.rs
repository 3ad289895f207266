mod alloc_cache;
mod section_registry;
mod stream_map;

pub use alloc_cache::*;
pub use section_registry::*;
pub use stream_map::*;
