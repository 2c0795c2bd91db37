//! Error types for device operations.

use crate::file::AccessMode;
use scull_storage::StoreError;
use std::io;
use thiserror::Error;

/// Result type for device operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Errors that can occur while opening or using a device.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// No device with this index is registered.
    #[error("no such device: {index} (registry holds {count})")]
    NoSuchDevice {
        /// The requested device index.
        index: usize,
        /// Number of registered devices.
        count: usize,
    },

    /// The handle was not opened for this kind of access.
    #[error("{operation} not permitted on a handle opened {mode}")]
    AccessDenied {
        /// Mode the handle was opened with.
        mode: AccessMode,
        /// The refused operation.
        operation: &'static str,
    },

    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl DeviceError {
    /// Returns true if the call was abandoned while waiting for the lock.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Store(StoreError::Interrupted))
    }
}

impl From<DeviceError> for io::Error {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::Store(err) => err.into(),
            DeviceError::NoSuchDevice { .. } => io::Error::new(io::ErrorKind::NotFound, err),
            DeviceError::AccessDenied { .. } => {
                io::Error::new(io::ErrorKind::PermissionDenied, err)
            }
        }
    }
}
