//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// The copy primitive could not move bytes to or from caller memory.
///
/// This is the analogue of a bad user-space address: the caller handed
/// the store a region that cannot hold (or does not contain) the bytes
/// the transfer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bad address: transfer needs {requested} bytes, region has {available}")]
pub struct CopyFault {
    /// Bytes the transfer tried to move.
    pub requested: usize,
    /// Bytes the caller region could actually provide or accept.
    pub available: usize,
}

/// Errors that can occur during store operations.
///
/// End-of-data and holes are not errors; they are reported through
/// [`crate::ReadOutcome`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Waiting for the store lock was abandoned because the caller was
    /// interrupted. No state was touched.
    #[error("interrupted while waiting for the store lock")]
    Interrupted,

    /// A block, slot array, or segment could not be obtained.
    #[error("allocation failure: could not obtain {requested} bytes")]
    AllocationFailure {
        /// Size of the allocation that failed.
        requested: usize,
    },

    /// The caller's buffer could not be copied to or from.
    #[error(transparent)]
    CopyFault(#[from] CopyFault),

    /// An argument was out of range (e.g. a seek to a negative position).
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the bad argument.
        message: String,
    },

    /// A quantum or qset size is unusable.
    #[error("invalid geometry: {message}")]
    InvalidGeometry {
        /// Description of the bad geometry.
        message: String,
    },

    /// The geometry of a store can only change while it holds no data.
    #[error("store is not empty; trim it before changing its geometry")]
    NotEmpty,
}

impl StoreError {
    /// Creates an allocation failure error.
    pub fn allocation_failure(requested: usize) -> Self {
        Self::AllocationFailure { requested }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an invalid geometry error.
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }

    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

impl From<StoreError> for io::Error {
    fn from(err: StoreError) -> Self {
        let kind = match &err {
            StoreError::Interrupted => io::ErrorKind::Interrupted,
            StoreError::AllocationFailure { .. } => io::ErrorKind::OutOfMemory,
            StoreError::CopyFault(_) => io::ErrorKind::InvalidData,
            StoreError::InvalidArgument { .. } | StoreError::InvalidGeometry { .. } => {
                io::ErrorKind::InvalidInput
            }
            StoreError::NotEmpty => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_io_kind_mapping() {
        let cases = [
            (StoreError::Interrupted, io::ErrorKind::Interrupted),
            (
                StoreError::allocation_failure(4000),
                io::ErrorKind::OutOfMemory,
            ),
            (
                StoreError::from(CopyFault {
                    requested: 8,
                    available: 4,
                }),
                io::ErrorKind::InvalidData,
            ),
            (
                StoreError::invalid_argument("negative"),
                io::ErrorKind::InvalidInput,
            ),
            (StoreError::NotEmpty, io::ErrorKind::Other),
        ];

        for (err, kind) in cases {
            assert_eq!(io::Error::from(err).kind(), kind);
        }
    }

    #[test]
    fn error_only_interrupted_is_retryable() {
        assert!(StoreError::Interrupted.is_retryable());
        assert!(!StoreError::allocation_failure(1).is_retryable());
        assert!(!StoreError::NotEmpty.is_retryable());
    }

    #[test]
    fn copy_fault_message() {
        let fault = CopyFault {
            requested: 10,
            available: 3,
        };
        assert_eq!(
            fault.to_string(),
            "bad address: transfer needs 10 bytes, region has 3"
        );
    }
}
