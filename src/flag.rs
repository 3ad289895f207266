/// Describes who owns a registered section handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SectionFlag {
    /// The first indication of the handle. The registry destroys it on reset.
    #[default]
    First,
    /// A secondary reference to a handle that is owned elsewhere.
    Shared,
}

impl SectionFlag {
    #[inline]
    pub fn is_first(&self) -> bool {
        matches!(self, SectionFlag::First)
    }
}

impl From<bool> for SectionFlag {
    #[inline]
    fn from(first_indication: bool) -> Self {
        if first_indication {
            SectionFlag::First
        } else {
            SectionFlag::Shared
        }
    }
}

/// What happens to a cache entry when its memory is freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FreePolicy {
    /// Keep the entry. A later allocation under the same name returns the freed address.
    #[default]
    Retain,
    /// Drop the entry and its aliases. A later allocation goes to the device again.
    Invalidate,
    /// Keep the entry, but refuse to hand out its address again.
    Strict,
}

impl core::str::FromStr for FreePolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "retain" => Ok(FreePolicy::Retain),
            "invalidate" => Ok(FreePolicy::Invalidate),
            "strict" => Ok(FreePolicy::Strict),
            _ => Err(format!(
                "'{s}' is not a free policy, expected one of: retain, invalidate, strict"
            )
            .into()),
        }
    }
}
