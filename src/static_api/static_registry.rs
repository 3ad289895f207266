use std::sync::Arc;

use parking_lot::{RwLock, const_rwlock};
use tracing::{debug, warn};

use crate::{DeviceApi, DeviceError, DeviceRegistry, RegistryConfig};

/// The SDK behind the static registry.
pub type DynApi = Box<dyn DeviceApi + Send + Sync>;
pub type DynRegistry = DeviceRegistry<DynApi>;

static GLOBAL_REGISTRY: RwLock<Option<Arc<DynRegistry>>> = const_rwlock(None);

/// Installs the process-wide registry. Called once when the device backend is initialized.
pub fn install(
    api: impl DeviceApi + Send + Sync + 'static,
    config: RegistryConfig,
) -> crate::Result<Arc<DynRegistry>> {
    let mut slot = GLOBAL_REGISTRY.write();
    if slot.is_some() {
        return Err(DeviceError::RegistryInstalled.into());
    }
    let registry = Arc::new(DeviceRegistry::with_config(Box::new(api) as DynApi, config));
    *slot = Some(registry.clone());
    debug!("static device registry installed");
    Ok(registry)
}

/// Returns the installed registry.
pub fn static_registry() -> crate::Result<Arc<DynRegistry>> {
    GLOBAL_REGISTRY
        .read()
        .clone()
        .ok_or_else(|| DeviceError::RegistryMissing.into())
}

#[inline]
pub fn is_installed() -> bool {
    GLOBAL_REGISTRY.read().is_some()
}

/// Removes the process-wide registry and shuts it down.
///
/// If other handles to the registry are still alive, the registry is cleared here
/// and released together with the last handle.
pub fn shutdown() -> crate::Result<()> {
    let registry = GLOBAL_REGISTRY
        .write()
        .take()
        .ok_or(DeviceError::RegistryMissing)?;

    match Arc::try_unwrap(registry) {
        Ok(registry) => registry.shutdown(),
        Err(shared) => {
            warn!(
                handles = Arc::strong_count(&shared) - 1,
                "static device registry is still referenced on shutdown"
            );
            shared.clear()
        }
    }
}
