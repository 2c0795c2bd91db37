//! Open handles on a device.

use crate::error::{DeviceError, DeviceResult};
use scull_storage::{split_seek, Interrupt, ReadOutcome, SeekBase, Store};
use serde::Serialize;
use std::fmt;
use std::io::{self, SeekFrom};
use std::sync::Arc;
use tracing::debug;

/// How a device was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessMode {
    /// Reads only.
    ReadOnly,
    /// Writes only; opening in this mode trims the device.
    WriteOnly,
    /// Reads and writes.
    ReadWrite,
}

impl AccessMode {
    /// Returns true if handles in this mode may read.
    #[must_use]
    pub fn can_read(self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite)
    }

    /// Returns true if handles in this mode may write.
    #[must_use]
    pub fn can_write(self) -> bool {
        matches!(self, Self::WriteOnly | Self::ReadWrite)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ReadOnly => "read-only",
            Self::WriteOnly => "write-only",
            Self::ReadWrite => "read-write",
        })
    }
}

/// An open handle on one device, with its own cursor.
///
/// Each chunk call moves at most one block's worth of bytes and advances
/// the cursor by exactly what moved. The [`io::Read`], [`io::Write`] and
/// [`io::Seek`] impls make the handle usable with `std::io::copy` and
/// friends; through `io::Read`, a hole looks like end-of-file, as it does
/// on the character device.
///
/// Dropping the handle releases it; the device keeps its data.
#[derive(Debug)]
pub struct DeviceFile {
    index: usize,
    store: Arc<Store>,
    mode: AccessMode,
    position: u64,
    interrupt: Interrupt,
}

impl DeviceFile {
    pub(crate) fn open(
        index: usize,
        store: Arc<Store>,
        mode: AccessMode,
        interrupt: Interrupt,
    ) -> DeviceResult<Self> {
        if mode == AccessMode::WriteOnly {
            store.lock_interruptible(&interrupt)?.trim();
            debug!(device = index, "trimmed on write-only open");
        }
        Ok(Self {
            index,
            store,
            mode,
            position: 0,
            interrupt,
        })
    }

    /// Index of the device in its registry.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Mode the handle was opened with.
    #[must_use]
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Current cursor position.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The interrupt this handle waits with; raise it from another thread
    /// to abandon a blocked call.
    #[must_use]
    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    /// Logical size of the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the wait for the lock was interrupted.
    pub fn size(&self) -> DeviceResult<u64> {
        Ok(self.store.lock_interruptible(&self.interrupt)?.size())
    }

    /// Reads one chunk at the cursor into `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::AccessDenied`] on a write-only handle, or
    /// the store's error; the cursor does not move on error.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> DeviceResult<ReadOutcome> {
        self.check(self.mode.can_read(), "read")?;
        let max_len = buf.len();
        let outcome = self
            .store
            .lock_interruptible(&self.interrupt)?
            .read(self.position, buf, max_len)?;
        self.position += outcome.len() as u64;
        Ok(outcome)
    }

    /// Writes one chunk of `data` at the cursor.
    ///
    /// Returns the bytes written, which may be fewer than `data.len()`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::AccessDenied`] on a read-only handle, or the
    /// store's error; the cursor does not move on error.
    pub fn write_chunk(&mut self, data: &[u8]) -> DeviceResult<usize> {
        self.check(self.mode.can_write(), "write")?;
        let written = self
            .store
            .lock_interruptible(&self.interrupt)?
            .write(self.position, data, data.len())?;
        self.position += written as u64;
        Ok(written)
    }

    /// Moves the cursor.
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if the position would be
    /// negative; the cursor is left where it was.
    pub fn seek_to(&mut self, base: SeekBase, offset: i64) -> DeviceResult<u64> {
        let position = self
            .store
            .lock_interruptible(&self.interrupt)?
            .seek(self.position, base, offset)?;
        self.position = position;
        Ok(position)
    }

    fn check(&self, allowed: bool, operation: &'static str) -> DeviceResult<()> {
        if allowed {
            Ok(())
        } else {
            Err(DeviceError::AccessDenied {
                mode: self.mode,
                operation,
            })
        }
    }
}

impl io::Read for DeviceFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_chunk(buf)?.len())
    }
}

impl io::Write for DeviceFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_chunk(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for DeviceFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, offset) = split_seek(pos).map_err(DeviceError::from)?;
        Ok(self.seek_to(base, offset)?)
    }
}
