use std::collections::BTreeMap;

use crate::{DeviceId, StreamHandle};

/// The stream used for each device.
#[derive(Debug, Default, Clone)]
pub struct StreamMap {
    streams: BTreeMap<DeviceId, StreamHandle>,
}

impl StreamMap {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stream of `device_id` and returns the previous one.
    #[inline]
    pub fn insert(&mut self, device_id: DeviceId, stream: StreamHandle) -> Option<StreamHandle> {
        self.streams.insert(device_id, stream)
    }

    #[inline]
    pub fn get(&self, device_id: DeviceId) -> Option<StreamHandle> {
        self.streams.get(&device_id).copied()
    }

    #[inline]
    pub fn remove(&mut self, device_id: DeviceId) -> Option<StreamHandle> {
        self.streams.remove(&device_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Device ids in ascending order.
    pub fn devices(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.streams.keys().copied()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.streams.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::StreamMap;
    use crate::StreamHandle;

    #[test]
    fn test_stream_map() {
        let mut streams = StreamMap::new();
        assert_eq!(streams.insert(1, StreamHandle(10)), None);
        assert_eq!(streams.insert(0, StreamHandle(20)), None);
        assert_eq!(streams.insert(1, StreamHandle(11)), Some(StreamHandle(10)));

        assert_eq!(streams.get(1), Some(StreamHandle(11)));
        assert_eq!(streams.devices().collect::<Vec<_>>(), vec![0, 1]);

        assert_eq!(streams.remove(0), Some(StreamHandle(20)));
        assert_eq!(streams.get(0), None);
        assert_eq!(streams.len(), 1);
    }
}
