use crate::devices::hpu::SynErrorKind;

mod std_err {
    pub type Error = Box<dyn std::error::Error + Send + Sync>;

    pub trait ErrorKind {
        fn kind<E: std::error::Error + PartialEq + 'static>(&self) -> Option<&E>;
    }

    impl ErrorKind for Error {
        fn kind<E: std::error::Error + PartialEq + 'static>(&self) -> Option<&E> {
            self.downcast_ref::<E>()
        }
    }

    impl std::error::Error for crate::DeviceError {}
    impl std::error::Error for crate::SectionDestroyError {}
}

pub use std_err::*;

pub type Result<T> = core::result::Result<T, self::std_err::Error>;

/// Failures introduced by the registry itself, as opposed to statuses reported by the SDK.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DeviceError {
    StaleAddress,
    KeyCollision,
    RegistryInstalled,
    RegistryMissing,
    UnknownSection,
    SectionNameTaken,
}

impl DeviceError {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceError::StaleAddress => {
                "The buffer name refers to device memory that was already freed."
            }
            DeviceError::KeyCollision => {
                "A cache key or alias key is already claimed by a different allocation."
            }
            DeviceError::RegistryInstalled => "A static device registry is already installed.",
            DeviceError::RegistryMissing => "No static device registry is installed.",
            DeviceError::UnknownSection => "No section is registered under this name.",
            DeviceError::SectionNameTaken => {
                "The section name is already registered to a different section handle."
            }
        }
    }
}

impl core::fmt::Debug for DeviceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl core::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Returned by a section reset when at least one owned handle could not be destroyed.
/// The registry is cleared regardless.
#[derive(Clone, PartialEq, Eq)]
pub struct SectionDestroyError {
    /// Number of handles destroyed successfully.
    pub destroyed: usize,
    /// Section names paired with the status the SDK returned for them.
    pub failed: Vec<(String, SynErrorKind)>,
}

impl core::fmt::Debug for SectionDestroyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} of {} section(s) could not be destroyed: ",
            self.failed.len(),
            self.failed.len() + self.destroyed
        )?;
        for (idx, (name, status)) in self.failed.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name} ({status})")?;
        }
        Ok(())
    }
}

impl core::fmt::Display for SectionDestroyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}
