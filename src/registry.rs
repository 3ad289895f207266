use core::ffi::c_void;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{
    AllocCache, CacheEntry, DEFAULT_ALIAS_SUFFIXES, DeviceAddr, DeviceApi, DeviceError, DeviceId,
    SectionEntry, SectionHandle, SectionRegistry, StreamHandle, StreamMap,
    flag::{FreePolicy, SectionFlag},
};

/// Environment variable read by [`RegistryConfig::from_env`] to select the [`FreePolicy`].
pub const FREE_POLICY_ENV: &str = "HPU_REGISTRY_FREE_POLICY";
/// Environment variable read by [`RegistryConfig::from_env`], a comma separated list of alias suffixes.
pub const ALIAS_SUFFIXES_ENV: &str = "HPU_REGISTRY_ALIAS_SUFFIXES";

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegistryConfig {
    /// Every allocation is reachable under `name + suffix` for each suffix.
    pub alias_suffixes: Vec<String>,
    pub free_policy: FreePolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            alias_suffixes: DEFAULT_ALIAS_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            free_policy: FreePolicy::default(),
        }
    }
}

impl RegistryConfig {
    /// The default configuration, overridden by [`FREE_POLICY_ENV`] and [`ALIAS_SUFFIXES_ENV`] if they are set.
    pub fn from_env() -> crate::Result<Self> {
        let mut config = RegistryConfig::default();
        if let Ok(policy) = std::env::var(FREE_POLICY_ENV) {
            config.free_policy = policy.parse()?;
        }
        if let Ok(suffixes) = std::env::var(ALIAS_SUFFIXES_ENV) {
            config.alias_suffixes = suffixes
                .split(',')
                .map(str::trim)
                .filter(|suffix| !suffix.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(config)
    }

    pub fn with_alias_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alias_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    pub fn with_free_policy(mut self, free_policy: FreePolicy) -> Self {
        self.free_policy = free_policy;
        self
    }
}

/// Where the address of an [`Allocation`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocOrigin {
    /// Newly allocated on the device.
    Fresh,
    /// Taken from a live cache entry.
    Cached,
    /// Taken from a cache entry whose memory was freed. The address is no longer valid.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub addr: DeviceAddr,
    /// Size of the allocation that created the cache entry.
    pub size: u64,
    /// Size asked for by this request. Ignored on cache hits.
    pub requested: u64,
    pub origin: AllocOrigin,
}

impl Allocation {
    #[inline]
    pub fn is_stale(&self) -> bool {
        self.origin == AllocOrigin::Stale
    }

    #[inline]
    pub fn size_mismatch(&self) -> bool {
        self.size != self.requested
    }
}

#[derive(Debug, Default)]
pub(crate) struct RegistryState {
    pub(crate) allocs: AllocCache,
    pub(crate) sections: SectionRegistry,
    pub(crate) streams: StreamMap,
}

/// Device memory and section registry of one device backend.
///
/// Repeated allocations of the same buffer name return the same device address,
/// sections are destroyed in bulk by [`DeviceRegistry::reset_tensor_sections`].
/// All bookkeeping sits behind one lock, SDK calls that touch the bookkeeping are made while holding it.
///
/// Dropping the registry resets the sections.
/// The cached device memory stays allocated, it belongs to the callers of [`DeviceRegistry::hbm_free`].
pub struct DeviceRegistry<A: DeviceApi> {
    api: A,
    config: RegistryConfig,
    pub(crate) state: Mutex<RegistryState>,
}

impl<A: DeviceApi> DeviceRegistry<A> {
    #[inline]
    pub fn new(api: A) -> Self {
        Self::with_config(api, RegistryConfig::default())
    }

    pub fn with_config(api: A, config: RegistryConfig) -> Self {
        debug!(
            free_policy = ?config.free_policy,
            alias_suffixes = ?config.alias_suffixes,
            "create device registry"
        );
        DeviceRegistry {
            api,
            config,
            state: Mutex::new(RegistryState::default()),
        }
    }

    #[inline]
    pub fn api(&self) -> &A {
        &self.api
    }

    #[inline]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Pins a host buffer for the device.
    /// # Safety
    /// `buffer` must point to at least `size` bytes that stay valid until [`DeviceRegistry::host_unmap`].
    pub unsafe fn host_map(
        &self,
        device_id: DeviceId,
        size: u64,
        buffer: *const c_void,
    ) -> crate::Result<()> {
        trace!(device_id, size, ?buffer, "host map");
        unsafe { self.api.host_map(device_id, size, buffer) }?;
        Ok(())
    }

    /// # Safety
    /// `buffer` must have been mapped with [`DeviceRegistry::host_map`] on the same device.
    pub unsafe fn host_unmap(
        &self,
        device_id: DeviceId,
        buffer: *const c_void,
    ) -> crate::Result<()> {
        trace!(device_id, ?buffer, "host unmap");
        unsafe { self.api.host_unmap(device_id, buffer) }?;
        Ok(())
    }

    /// Returns the device address of the buffer `name`, allocating `size` bytes on the first request.
    ///
    /// `name` may be a primary buffer name or one of its aliases. On a cache hit `size` is not
    /// checked against the original allocation, [`Allocation::size_mismatch`] reports it.
    ///
    /// A failing device allocation caches nothing and returns the SDK status.
    pub fn hbm_alloc(
        &self,
        device_id: DeviceId,
        size: u64,
        name: &str,
    ) -> crate::Result<Allocation> {
        let mut state = self.state.lock();

        if let Some((primary, entry)) = state.allocs.resolve(name) {
            let origin = if entry.is_live() {
                AllocOrigin::Cached
            } else if self.config.free_policy == FreePolicy::Strict {
                warn!(
                    buffer = name,
                    primary,
                    addr = entry.addr,
                    "refusing to reuse freed device memory"
                );
                return Err(DeviceError::StaleAddress.into());
            } else {
                warn!(
                    buffer = name,
                    primary,
                    addr = entry.addr,
                    "reusing freed device memory"
                );
                AllocOrigin::Stale
            };

            if entry.size != size {
                debug!(
                    buffer = name,
                    cached = entry.size,
                    requested = size,
                    "size differs from cached allocation"
                );
            }
            if entry.device_id != device_id {
                debug!(
                    buffer = name,
                    cached = entry.device_id,
                    requested = device_id,
                    "buffer was allocated on another device"
                );
            }
            trace!(buffer = name, primary, addr = entry.addr, "hbm cache hit");

            return Ok(Allocation {
                addr: entry.addr,
                size: entry.size,
                requested: size,
                origin,
            });
        }

        let aliases = AllocCache::alias_keys(name, &self.config.alias_suffixes);
        if aliases.iter().any(|alias| state.allocs.contains_key(alias)) {
            warn!(
                buffer = name,
                ?aliases,
                "alias of buffer is claimed by another allocation"
            );
            return Err(DeviceError::KeyCollision.into());
        }

        let addr = self.api.device_malloc(device_id, size)?;
        debug!(buffer = name, device_id, size, addr, "hbm alloc");

        state
            .allocs
            .insert(name.to_string(), CacheEntry::new(device_id, addr, size, aliases))?;

        Ok(Allocation {
            addr,
            size,
            requested: size,
            origin: AllocOrigin::Fresh,
        })
    }

    /// Frees device memory and updates the cache entry of `name` according to the [`FreePolicy`].
    ///
    /// The entry is left alone if it holds a different address than `addr`.
    /// # Safety
    /// `addr` must be a live allocation of `device_id` that is not used afterwards.
    pub unsafe fn hbm_free(
        &self,
        device_id: DeviceId,
        addr: DeviceAddr,
        name: &str,
    ) -> crate::Result<()> {
        let mut state = self.state.lock();

        unsafe { self.api.device_free(device_id, addr) }?;
        debug!(buffer = name, device_id, addr, "hbm free");

        let cached = state.allocs.get(name).map(|entry| (entry.device_id, entry.addr));
        match cached {
            Some(cached) if cached != (device_id, addr) => {
                warn!(
                    buffer = name,
                    freed = addr,
                    cached = cached.1,
                    "freed address differs from the cached one, cache entry kept"
                );
            }
            Some(_) => match self.config.free_policy {
                FreePolicy::Retain | FreePolicy::Strict => {
                    state.allocs.mark_freed(name);
                }
                FreePolicy::Invalidate => {
                    state.allocs.remove(name);
                }
            },
            None => trace!(buffer = name, "freed buffer was not cached"),
        }
        Ok(())
    }

    /// The cached address of `name` (primary or alias), freed entries included.
    #[inline]
    pub fn cached_addr(&self, name: &str) -> Option<DeviceAddr> {
        self.state.lock().allocs.addr(name)
    }

    #[inline]
    pub fn cache_entry(&self, name: &str) -> Option<CacheEntry> {
        self.state.lock().allocs.get(name).cloned()
    }

    /// Number of cached allocations, aliases not counted.
    #[inline]
    pub fn cache_len(&self) -> usize {
        self.state.lock().allocs.len()
    }

    /// Number of cache keys, aliases included.
    #[inline]
    pub fn cache_key_count(&self) -> usize {
        self.state.lock().allocs.key_count()
    }

    /// All cached allocations sorted by name.
    pub fn cache_entries(&self) -> Vec<(String, CacheEntry)> {
        let state = self.state.lock();
        let mut entries = state
            .allocs
            .iter()
            .map(|(name, entry)| (name.to_string(), entry.clone()))
            .collect::<Vec<_>>();
        entries.sort_by(|lhs, rhs| lhs.0.cmp(&rhs.0));
        entries
    }

    /// Registers a section handle under `name` and returns the entry it replaced.
    /// # Safety
    /// If `flag` is [`SectionFlag::First`], `handle` must be a valid section of this device
    /// that is destroyed by nothing but this registry.
    pub unsafe fn add_section(
        &self,
        name: impl Into<String>,
        handle: SectionHandle,
        flag: impl Into<SectionFlag>,
    ) -> Option<SectionEntry> {
        let name = name.into();
        let flag = flag.into();
        trace!(section = %name, ?handle, ?flag, "add section");

        let replaced = self.state.lock().sections.insert(name, handle, flag);
        if let Some(old) = replaced {
            if old.flag.is_first() && old.handle != handle {
                warn!(
                    old_handle = ?old.handle,
                    "replaced an owned section, it will not be destroyed by reset"
                );
            } else if old.flag.is_first() && !flag.is_first() {
                warn!(
                    ?handle,
                    "section re-registered as shared, it will not be destroyed by reset"
                );
            }
        }
        replaced
    }

    /// Registers the section behind `name` a second time under `alias`, without ownership.
    ///
    /// Fails with [`DeviceError::SectionNameTaken`] if `alias` already names another section.
    /// If `alias` already refers to the same handle, its entry is left as it is.
    pub fn share_section(
        &self,
        name: &str,
        alias: impl Into<String>,
    ) -> crate::Result<SectionHandle> {
        let mut state = self.state.lock();
        let handle = state
            .sections
            .get(name)
            .map(|entry| entry.handle)
            .ok_or(DeviceError::UnknownSection)?;

        let alias = alias.into();
        match state.sections.get(&alias) {
            Some(entry) if entry.handle != handle => {
                return Err(DeviceError::SectionNameTaken.into());
            }
            Some(_) => {}
            None => {
                state.sections.insert(alias, handle, SectionFlag::Shared);
            }
        }
        Ok(handle)
    }

    #[inline]
    pub fn section(&self, name: &str) -> Option<SectionEntry> {
        self.state.lock().sections.get(name).copied()
    }

    #[inline]
    pub fn section_count(&self) -> usize {
        self.state.lock().sections.len()
    }

    /// Destroys every section registered with [`SectionFlag::First`] and clears all sections.
    ///
    /// Returns the number of destroyed sections. If a destroy fails, the other sections are still
    /// destroyed, the registry is still cleared, and a [`SectionDestroyError`](crate::SectionDestroyError)
    /// lists the failures.
    pub fn reset_tensor_sections(&self) -> crate::Result<usize> {
        let mut state = self.state.lock();
        // Safety: handles flagged first are valid by the contract of `add_section`
        let destroyed = unsafe { state.sections.reset(&self.api) }?;
        Ok(destroyed)
    }

    /// Sets the stream of `device_id` and returns the previous one.
    #[inline]
    pub fn set_stream(&self, device_id: DeviceId, stream: StreamHandle) -> Option<StreamHandle> {
        self.state.lock().streams.insert(device_id, stream)
    }

    #[inline]
    pub fn stream(&self, device_id: DeviceId) -> Option<StreamHandle> {
        self.state.lock().streams.get(device_id)
    }

    #[inline]
    pub fn remove_stream(&self, device_id: DeviceId) -> Option<StreamHandle> {
        self.state.lock().streams.remove(device_id)
    }

    /// Resets the sections and forgets all streams and cached allocations.
    /// Streams and cache are cleared even if resetting the sections fails.
    pub fn clear(&self) -> crate::Result<()> {
        let mut state = self.state.lock();
        // Safety: handles flagged first are valid by the contract of `add_section`
        let reset = unsafe { state.sections.reset(&self.api) };
        state.streams.clear();
        state.allocs.clear();
        reset?;
        Ok(())
    }

    /// Clears the registry, see [`DeviceRegistry::clear`].
    pub fn shutdown(self) -> crate::Result<()> {
        let cleared = self.clear();
        debug!("device registry shut down");
        cleared
    }
}

impl<A: DeviceApi> core::fmt::Debug for DeviceRegistry<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut debug = f.debug_struct("DeviceRegistry");
        debug.field("config", &self.config);
        match self.state.try_lock() {
            Some(state) => debug.field("state", &*state),
            None => debug.field("state", &"<locked>"),
        };
        debug.finish_non_exhaustive()
    }
}

impl<A: DeviceApi> Drop for DeviceRegistry<A> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.sections.is_empty() {
            return;
        }
        if let Err(e) = unsafe { state.sections.reset(&self.api) } {
            warn!(error = %e, "dropping device registry");
        }
    }
}
