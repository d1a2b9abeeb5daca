use crate::device::DeviceId;

/// Indicates why a device in a [`DeviceMap`](super::DeviceMap) could not be reached.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("device {device_id} is already registered")]
    AlreadyPresent { device_id: DeviceId },

    #[error("device {device_id} is not registered")]
    NotFound { device_id: DeviceId },

    /// A [`DeviceRef`](super::DeviceRef) outlived the device it pointed at.
    #[error("device {device_id} has been retired")]
    Retired { device_id: DeviceId },

    #[error("device {device_id} is still being driven and cannot be retired")]
    InUse { device_id: DeviceId },
}
