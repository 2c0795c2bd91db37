//! Cursor arithmetic for seeking.

use crate::error::{StoreError, StoreResult};
use std::io::SeekFrom;

/// What a seek offset is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekBase {
    /// Absolute position zero.
    Start,
    /// The caller's current position.
    Current,
    /// The end of data (the store's logical size).
    End,
}

impl TryFrom<i32> for SeekBase {
    type Error = StoreError;

    /// Converts a raw whence code (0, 1, 2).
    fn try_from(whence: i32) -> StoreResult<Self> {
        match whence {
            0 => Ok(Self::Start),
            1 => Ok(Self::Current),
            2 => Ok(Self::End),
            other => Err(StoreError::invalid_argument(format!(
                "unknown seek base {other}"
            ))),
        }
    }
}

/// Splits a [`SeekFrom`] into a base and a signed offset.
///
/// # Errors
///
/// Returns [`StoreError::InvalidArgument`] if an absolute position does
/// not fit in `i64`.
pub fn split_seek(pos: SeekFrom) -> StoreResult<(SeekBase, i64)> {
    match pos {
        SeekFrom::Start(offset) => i64::try_from(offset)
            .map(|offset| (SeekBase::Start, offset))
            .map_err(|_| StoreError::invalid_argument(format!("seek to {offset} is too far"))),
        SeekFrom::Current(offset) => Ok((SeekBase::Current, offset)),
        SeekFrom::End(offset) => Ok((SeekBase::End, offset)),
    }
}

/// Applies `offset` to `origin`.
///
/// # Errors
///
/// Returns [`StoreError::InvalidArgument`] if the result is negative or
/// past `u64::MAX`.
pub(crate) fn resolve(origin: u64, offset: i64) -> StoreResult<u64> {
    origin.checked_add_signed(offset).ok_or_else(|| {
        StoreError::invalid_argument(format!(
            "seek from {origin} by {offset} leaves the address space"
        ))
    })
}
