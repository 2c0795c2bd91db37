//! Copy primitives between caller memory and block buffers.
//!
//! The store never touches caller memory directly. Reads hand bytes to a
//! [`ByteSink`], writes pull bytes from a [`ByteSource`]; either side may
//! refuse with a [`CopyFault`], which aborts the transfer before the
//! caller's position moves.

use crate::error::CopyFault;

/// Destination of a read.
pub trait ByteSink {
    /// Copies all of `bytes` to the front of the destination.
    ///
    /// # Errors
    ///
    /// Returns a [`CopyFault`] if the destination cannot take `bytes.len()`
    /// bytes. Nothing is copied in that case.
    fn accept(&mut self, bytes: &[u8]) -> Result<(), CopyFault>;
}

/// Origin of a write.
pub trait ByteSource {
    /// Fills all of `dst` from the front of the source.
    ///
    /// # Errors
    ///
    /// Returns a [`CopyFault`] if the source holds fewer than `dst.len()`
    /// bytes. `dst` is left untouched in that case.
    fn provide(&self, dst: &mut [u8]) -> Result<(), CopyFault>;
}

impl ByteSink for [u8] {
    fn accept(&mut self, bytes: &[u8]) -> Result<(), CopyFault> {
        let available = self.len();
        let dst = self.get_mut(..bytes.len()).ok_or(CopyFault {
            requested: bytes.len(),
            available,
        })?;
        dst.copy_from_slice(bytes);
        Ok(())
    }
}

impl ByteSink for Vec<u8> {
    fn accept(&mut self, bytes: &[u8]) -> Result<(), CopyFault> {
        self.try_reserve(bytes.len()).map_err(|_| CopyFault {
            requested: bytes.len(),
            available: self.capacity() - self.len(),
        })?;
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl ByteSource for [u8] {
    fn provide(&self, dst: &mut [u8]) -> Result<(), CopyFault> {
        let src = self.get(..dst.len()).ok_or(CopyFault {
            requested: dst.len(),
            available: self.len(),
        })?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

impl ByteSource for Vec<u8> {
    fn provide(&self, dst: &mut [u8]) -> Result<(), CopyFault> {
        self.as_slice().provide(dst)
    }
}
