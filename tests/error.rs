use hpu_registry::{DeviceError, Error, ErrorKind, hpu::SynErrorKind};

#[test]
fn test_print_error() {
    let err = Error::from(DeviceError::StaleAddress);
    assert_eq!(
        "The buffer name refers to device memory that was already freed.",
        &format!("{err}")
    );
    assert_eq!(
        "The buffer name refers to device memory that was already freed.",
        &format!("{err:?}")
    );
}

#[test]
fn test_std_err() {
    let err = Error::from(DeviceError::KeyCollision);
    assert_eq!(
        err.downcast_ref::<DeviceError>(),
        Some(&DeviceError::KeyCollision)
    );
}

#[test]
fn test_syn_error_kind() {
    let err = Error::from(SynErrorKind::OutOfDeviceMemory);
    assert_eq!(err.kind(), Some(&SynErrorKind::OutOfDeviceMemory));
    assert_eq!(err.kind::<DeviceError>(), None);
    assert_eq!(format!("{err}"), "Out of device memory");
}

#[cfg(feature = "host")]
#[test]
fn test_questionmark() -> Result<(), Error> {
    use hpu_registry::{DeviceRegistry, host::HostDevice};

    let registry = DeviceRegistry::new(HostDevice::new());
    registry.hbm_alloc(0, 16, "w")?;
    registry.shutdown()?;
    Ok(())
}
