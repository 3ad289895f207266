use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CacheEntry, DeviceApi, DeviceId, DeviceRegistry, flag::SectionFlag};

/// A serializable copy of the bookkeeping of a [`DeviceRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub allocations: BTreeMap<String, CacheEntry>,
    pub sections: BTreeMap<String, SectionFlag>,
    pub stream_devices: Vec<DeviceId>,
}

impl<A: DeviceApi> DeviceRegistry<A> {
    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.state.lock();
        RegistrySnapshot {
            allocations: state
                .allocs
                .iter()
                .map(|(name, entry)| (name.to_string(), entry.clone()))
                .collect(),
            sections: state
                .sections
                .iter()
                .map(|(name, entry)| (name.to_string(), entry.flag))
                .collect(),
            stream_devices: state.streams.devices().collect(),
        }
    }

    #[cfg(feature = "json")]
    pub fn snapshot_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}
