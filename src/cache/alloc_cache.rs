use std::collections::HashMap;

use crate::{DeviceAddr, DeviceError, DeviceId};

/// Alias suffixes registered next to every buffer name unless configured otherwise.
pub const DEFAULT_ALIAS_SUFFIXES: [&str; 2] = ["_wu", "_wu_out"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryState {
    Live,
    Freed,
}

/// One device allocation, reachable under its primary name and all of its aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheEntry {
    pub device_id: DeviceId,
    pub addr: DeviceAddr,
    /// The size in bytes requested by the allocation that created the entry.
    pub size: u64,
    pub aliases: Vec<String>,
    pub state: EntryState,
}

impl CacheEntry {
    pub fn new(device_id: DeviceId, addr: DeviceAddr, size: u64, aliases: Vec<String>) -> Self {
        CacheEntry {
            device_id,
            addr,
            size,
            aliases,
            state: EntryState::Live,
        }
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.state == EntryState::Live
    }
}

/// Name-keyed cache of device addresses.
///
/// Entries are stored under their primary name. Alias keys point back to the primary name,
/// so a lookup under an alias resolves to the same entry.
#[derive(Debug, Default, Clone)]
pub struct AllocCache {
    entries: HashMap<String, CacheEntry>,
    aliases: HashMap<String, String>,
}

impl AllocCache {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the alias keys of `name`. Suffixes that produce `name` itself or a duplicate are skipped.
    pub fn alias_keys<S: AsRef<str>>(name: &str, suffixes: &[S]) -> Vec<String> {
        let mut keys: Vec<String> = Vec::with_capacity(suffixes.len());
        for suffix in suffixes {
            let key = format!("{name}{}", suffix.as_ref());
            if key != name && !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Returns the primary name and entry for a primary or alias key.
    pub fn resolve(&self, key: &str) -> Option<(&str, &CacheEntry)> {
        let primary = match self.entries.get_key_value(key) {
            Some((primary, entry)) => return Some((primary.as_str(), entry)),
            None => self.aliases.get(key)?,
        };
        self.entries
            .get_key_value(primary.as_str())
            .map(|(primary, entry)| (primary.as_str(), entry))
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.resolve(key).map(|(_, entry)| entry)
    }

    #[inline]
    pub fn addr(&self, key: &str) -> Option<DeviceAddr> {
        self.get(key).map(|entry| entry.addr)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key) || self.aliases.contains_key(key)
    }

    /// Adds an entry under `name`.
    /// Fails with [`DeviceError::KeyCollision`] if `name` or one of the entry's aliases is already claimed.
    pub fn insert(&mut self, name: String, entry: CacheEntry) -> Result<(), DeviceError> {
        if self.contains_key(&name) || entry.aliases.iter().any(|alias| self.contains_key(alias)) {
            return Err(DeviceError::KeyCollision);
        }
        for alias in &entry.aliases {
            self.aliases.insert(alias.clone(), name.clone());
        }
        self.entries.insert(name, entry);
        Ok(())
    }

    /// Marks the entry behind `key` as freed and returns it.
    pub fn mark_freed(&mut self, key: &str) -> Option<&CacheEntry> {
        let primary = self.primary_of(key)?;
        let entry = self.entries.get_mut(&primary)?;
        entry.state = EntryState::Freed;
        Some(entry)
    }

    /// Removes the entry behind `key` together with all of its aliases.
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let primary = self.primary_of(key)?;
        let entry = self.entries.remove(&primary)?;
        for alias in &entry.aliases {
            self.aliases.remove(alias);
        }
        Some(entry)
    }

    fn primary_of(&self, key: &str) -> Option<String> {
        self.resolve(key).map(|(primary, _)| primary.to_string())
    }

    /// Number of allocations, aliases not counted.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of keys that resolve to an entry, aliases included.
    #[inline]
    pub fn key_count(&self) -> usize {
        self.entries.len() + self.aliases.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
        self.aliases.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{AllocCache, CacheEntry, DEFAULT_ALIAS_SUFFIXES, EntryState};
    use crate::DeviceError;

    fn entry(name: &str, addr: u64) -> CacheEntry {
        CacheEntry::new(0, addr, 64, AllocCache::alias_keys(name, &DEFAULT_ALIAS_SUFFIXES))
    }

    #[test]
    fn test_alias_keys() {
        assert_eq!(
            AllocCache::alias_keys("w", &DEFAULT_ALIAS_SUFFIXES),
            vec!["w_wu".to_string(), "w_wu_out".to_string()]
        );
        assert_eq!(AllocCache::alias_keys("w", &["", "_a", "_a"]), vec!["w_a".to_string()]);
    }

    #[test]
    fn test_resolve_alias() {
        let mut cache = AllocCache::new();
        cache.insert("w".into(), entry("w", 0x100)).unwrap();

        assert_eq!(cache.addr("w"), Some(0x100));
        assert_eq!(cache.addr("w_wu"), Some(0x100));
        assert_eq!(cache.addr("w_wu_out"), Some(0x100));
        assert_eq!(cache.resolve("w_wu").map(|(primary, _)| primary), Some("w"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.key_count(), 3);
    }

    #[test]
    fn test_insert_collision() {
        let mut cache = AllocCache::new();
        cache.insert("a_wu".into(), entry("a_wu", 0x100)).unwrap();

        // "a" would claim "a_wu" as an alias
        assert_eq!(
            cache.insert("a".into(), entry("a", 0x200)),
            Err(DeviceError::KeyCollision)
        );
        assert_eq!(cache.addr("a_wu"), Some(0x100));
        assert!(!cache.contains_key("a"));
        assert!(!cache.contains_key("a_wu_out"));
    }

    #[test]
    fn test_mark_freed_through_alias() {
        let mut cache = AllocCache::new();
        cache.insert("w".into(), entry("w", 0x100)).unwrap();

        let freed = cache.mark_freed("w_wu_out").unwrap();
        assert_eq!(freed.state, EntryState::Freed);
        assert!(!cache.get("w").unwrap().is_live());
    }

    #[test]
    fn test_remove_drops_aliases() {
        let mut cache = AllocCache::new();
        cache.insert("w".into(), entry("w", 0x100)).unwrap();
        cache.insert("v".into(), entry("v", 0x200)).unwrap();

        let removed = cache.remove("w_wu").unwrap();
        assert_eq!(removed.addr, 0x100);
        assert!(!cache.contains_key("w"));
        assert!(!cache.contains_key("w_wu"));
        assert!(!cache.contains_key("w_wu_out"));
        assert_eq!(cache.key_count(), 3);
    }
}
