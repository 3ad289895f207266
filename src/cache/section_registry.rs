use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{DeviceApi, SectionDestroyError, SectionHandle, flag::SectionFlag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionEntry {
    pub handle: SectionHandle,
    pub flag: SectionFlag,
}

/// Section handles keyed by section name.
#[derive(Debug, Default)]
pub struct SectionRegistry {
    sections: HashMap<String, SectionEntry>,
}

impl SectionRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle` under `name` and returns the entry it replaced.
    pub fn insert(
        &mut self,
        name: String,
        handle: SectionHandle,
        flag: SectionFlag,
    ) -> Option<SectionEntry> {
        self.sections.insert(name, SectionEntry { handle, flag })
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&SectionEntry> {
        self.sections.get(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SectionEntry)> {
        self.sections.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Destroys every first-indication handle and empties the registry.
    ///
    /// All owned handles are attempted, a failing destroy does not stop the others.
    /// The registry is empty afterwards in any case.
    /// Returns the number of destroyed handles.
    ///
    /// # Safety
    /// Every entry flagged [`SectionFlag::First`] must hold a valid handle of `api`
    /// that is not destroyed anywhere else.
    pub unsafe fn reset<A: DeviceApi + ?Sized>(
        &mut self,
        api: &A,
    ) -> Result<usize, SectionDestroyError> {
        let mut destroyed = 0;
        let mut failed = Vec::new();

        for (name, entry) in self.sections.drain() {
            if !entry.flag.is_first() {
                continue;
            }
            match unsafe { api.section_destroy(entry.handle) } {
                Ok(()) => destroyed += 1,
                Err(kind) => {
                    warn!(section = %name, status = %kind, "could not destroy section");
                    failed.push((name, kind));
                }
            }
        }
        debug!(destroyed, failed = failed.len(), "reset tensor sections");

        if failed.is_empty() {
            Ok(destroyed)
        } else {
            failed.sort_by(|lhs, rhs| lhs.0.cmp(&rhs.0));
            Err(SectionDestroyError { destroyed, failed })
        }
    }
}
