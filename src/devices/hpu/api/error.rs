pub type SynResult<T> = std::result::Result<T, SynErrorKind>;

macro_rules! syn_statuses {
    ($($raw:literal => $status:ident, $kind:ident, $msg:literal;)*) => {
        /// Status codes returned by every Synapse API call.
        #[repr(u32)]
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[allow(non_camel_case_types)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum SynStatus {
            synSuccess = 0,
            $($status = $raw,)*
        }

        /// Every non-success [`SynStatus`].
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum SynErrorKind {
            $($kind,)*
            /// A raw status value outside of the known range.
            Unknown(u32),
        }

        impl SynErrorKind {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(SynErrorKind::$kind => $msg,)*
                    SynErrorKind::Unknown(_) => "Unknown Synapse status",
                }
            }

            /// The status the SDK reported for this error.
            /// Unknown values are reported as [`SynStatus::synFail`].
            pub fn status(&self) -> SynStatus {
                match self {
                    $(SynErrorKind::$kind => SynStatus::$status,)*
                    SynErrorKind::Unknown(_) => SynStatus::synFail,
                }
            }
        }

        impl SynStatus {
            pub fn from_raw(raw: u32) -> SynResult<()> {
                match raw {
                    0 => Ok(()),
                    $($raw => Err(SynErrorKind::$kind),)*
                    _ => Err(SynErrorKind::Unknown(raw)),
                }
            }

            pub fn to_result(self) -> SynResult<()> {
                match self {
                    SynStatus::synSuccess => Ok(()),
                    $(SynStatus::$status => Err(SynErrorKind::$kind),)*
                }
            }
        }
    };
}

syn_statuses! {
    1 => synInvalidArgument, InvalidArgument, "Invalid argument";
    2 => synCbFull, CbFull, "Command buffer is full";
    3 => synOutOfHostMemory, OutOfHostMemory, "Out of host memory";
    4 => synOutOfDeviceMemory, OutOfDeviceMemory, "Out of device memory";
    5 => synObjectAlreadyInitialized, ObjectAlreadyInitialized, "Object already initialized";
    6 => synObjectNotInitialized, ObjectNotInitialized, "Object not initialized";
    7 => synCommandSubmissionFailure, CommandSubmissionFailure, "Command submission failed";
    8 => synNoDeviceFound, NoDeviceFound, "No device found";
    9 => synDeviceTypeMismatch, DeviceTypeMismatch, "Device type mismatch";
    10 => synFailedToInitializeCb, FailedToInitializeCb, "Failed to initialize command buffer";
    11 => synFailedToFreeCb, FailedToFreeCb, "Failed to free command buffer";
    12 => synFailedToMapCb, FailedToMapCb, "Failed to map command buffer";
    13 => synFailedToUnmapCb, FailedToUnmapCb, "Failed to unmap command buffer";
    14 => synFailedToAllocateDeviceMemory, FailedToAllocateDeviceMemory, "Failed to allocate device memory";
    15 => synFailedToFreeDeviceMemory, FailedToFreeDeviceMemory, "Failed to free device memory";
    16 => synFailedNotEnoughDevicesFound, FailedNotEnoughDevicesFound, "Not enough devices found";
    17 => synDeviceReset, DeviceReset, "Device was reset";
    18 => synUnsupported, Unsupported, "Unsupported operation";
    19 => synWrongParamsFile, WrongParamsFile, "Wrong parameters file";
    20 => synDeviceAlreadyAcquired, DeviceAlreadyAcquired, "Device already acquired";
    21 => synNameIsAlreadyUsed, NameIsAlreadyUsed, "Name is already used";
    22 => synBusy, Busy, "Device busy";
    23 => synAllResourcesTaken, AllResourcesTaken, "All resources taken";
    24 => synUnavailable, Unavailable, "Unavailable";
    25 => synInvalidTensorDimensions, InvalidTensorDimensions, "Invalid tensor dimensions";
    26 => synFail, Fail, "Operation failed";
    27 => synOutOfResources, OutOfResources, "Out of resources";
    28 => synUninitialized, Uninitialized, "Synapse is not initialized";
    29 => synAlreadyInitialized, AlreadyInitialized, "Synapse is already initialized";
    30 => synFailedSectionValidation, FailedSectionValidation, "Section validation failed";
    31 => synSynapseTerminated, SynapseTerminated, "Synapse was terminated";
    32 => synAssertAsync, AssertAsync, "Asynchronous assertion";
    33 => synInvalidEventHandle, InvalidEventHandle, "Invalid event handle";
    34 => synMappingNotFound, MappingNotFound, "Host mapping not found";
    35 => synFailedDynamicPatching, FailedDynamicPatching, "Dynamic patching failed";
    36 => synFailedStaticPatching, FailedStaticPatching, "Static patching failed";
    37 => synFailedToSubmitWorkload, FailedToSubmitWorkload, "Failed to submit workload";
    38 => synInvalidSectionsDefinition, InvalidSectionsDefinition, "Invalid sections definition";
    39 => synInvalidTensorProperties, InvalidTensorProperties, "Invalid tensor properties";
    40 => synFailHccl, FailHccl, "HCCL failure";
    41 => synFailedToCollectTime, FailedToCollectTime, "Failed to collect time";
    42 => synTimeout, Timeout, "Timeout";
    43 => synResourceBadUsage, ResourceBadUsage, "Resource bad usage";
}

impl From<SynStatus> for SynResult<()> {
    #[inline]
    fn from(status: SynStatus) -> Self {
        status.to_result()
    }
}

impl From<SynResult<()>> for SynStatus {
    #[inline]
    fn from(result: SynResult<()>) -> Self {
        match result {
            Ok(()) => SynStatus::synSuccess,
            Err(kind) => kind.status(),
        }
    }
}

impl core::fmt::Debug for SynErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SynErrorKind::Unknown(raw) => write!(f, "{} ({raw})", self.as_str()),
            _ => write!(f, "{}", self.as_str()),
        }
    }
}

impl core::fmt::Display for SynErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for SynErrorKind {}
