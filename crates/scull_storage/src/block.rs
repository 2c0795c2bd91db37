//! Fixed-capacity leaf buffers.

use crate::alloc::{self, MemoryBudget};
use crate::error::StoreResult;
use tracing::debug;

/// One quantum of storage.
///
/// Blocks are zero-filled when allocated, so bytes that were never
/// written read back as `0x00`. A block is owned by exactly one segment
/// slot and is never resized.
#[derive(Debug)]
pub(crate) struct Block {
    bytes: Box<[u8]>,
}

impl Block {
    /// Allocates a zeroed block of `quantum_size` bytes.
    pub(crate) fn allocate(quantum_size: usize, budget: &mut MemoryBudget) -> StoreResult<Self> {
        let bytes = alloc::filled(budget, quantum_size, 1, || 0u8)?;
        debug!(quantum_size, "allocated block");
        Ok(Self { bytes })
    }

    pub(crate) fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// `len` bytes starting at `offset`; the caller keeps the range
    /// inside the block.
    pub(crate) fn region(&self, offset: usize, len: usize) -> &[u8] {
        &self.bytes[offset..offset + len]
    }

    pub(crate) fn region_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        &mut self.bytes[offset..offset + len]
    }
}
