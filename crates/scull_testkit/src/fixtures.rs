//! Test fixtures and store helpers.
//!
//! Provides small-geometry stores, deterministic data, whole-range
//! read/write loops, and copy buffers that fault on demand.

use scull_storage::{
    ByteSink, ByteSource, CopyFault, ReadOutcome, Store, StoreConfig, StoreResult,
};

/// Block size used by [`small_store`].
pub const SMALL_QUANTUM: usize = 8;

/// Slots per segment used by [`small_store`].
pub const SMALL_QSET: usize = 4;

/// A store whose segments cover only 32 bytes, so tests cross block and
/// segment edges with little data.
pub fn small_store() -> Store {
    Store::new(
        StoreConfig::new()
            .quantum_size(SMALL_QUANTUM)
            .qset_size(SMALL_QSET),
    )
    .expect("small geometry is valid")
}

/// Deterministic, non-repeating-per-block test bytes.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Writes all of `data` at `offset`, looping over block edges.
///
/// Returns the number of write calls it took.
pub fn write_fully(store: &Store, mut offset: u64, data: &[u8]) -> StoreResult<usize> {
    let mut written = 0;
    let mut calls = 0;
    while written < data.len() {
        let n = store.write(offset, &data[written..], data.len() - written)?;
        written += n;
        offset += n as u64;
        calls += 1;
    }
    Ok(calls)
}

/// Reads from `offset` until a hole, end-of-data, or `max_len` bytes.
///
/// Returns the bytes read and the outcome that stopped the loop
/// (`Transferred` if `max_len` was reached).
pub fn read_until_stop(
    store: &Store,
    mut offset: u64,
    max_len: usize,
) -> StoreResult<(Vec<u8>, ReadOutcome)> {
    let mut out = Vec::new();
    loop {
        let want = max_len - out.len();
        let outcome = store.read(offset, &mut out, want)?;
        match outcome {
            ReadOutcome::Transferred(n) if out.len() < max_len && n > 0 => offset += n as u64,
            other => return Ok((out, other)),
        }
    }
}

/// A copy buffer that faults once `limit` bytes have moved through it.
///
/// Stands in for a caller region that is partly unmapped.
#[derive(Debug, Clone)]
pub struct FaultyBuffer {
    data: Vec<u8>,
    limit: usize,
}

impl FaultyBuffer {
    /// A buffer that refuses every copy.
    pub fn always() -> Self {
        Self::after(0)
    }

    /// A sink that accepts up to `limit` bytes in total.
    pub fn after(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }

    /// A source holding `data` that can only supply its first `limit`
    /// bytes.
    pub fn source(data: Vec<u8>, limit: usize) -> Self {
        Self { data, limit }
    }

    /// Bytes accepted so far (sink) or held (source).
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl ByteSink for FaultyBuffer {
    fn accept(&mut self, bytes: &[u8]) -> Result<(), CopyFault> {
        let available = self.limit.saturating_sub(self.data.len());
        if bytes.len() > available {
            return Err(CopyFault {
                requested: bytes.len(),
                available,
            });
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }
}

impl ByteSource for FaultyBuffer {
    fn provide(&self, dst: &mut [u8]) -> Result<(), CopyFault> {
        let available = self.limit.min(self.data.len());
        if dst.len() > available {
            return Err(CopyFault {
                requested: dst.len(),
                available,
            });
        }
        dst.copy_from_slice(&self.data[..dst.len()]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_is_deterministic() {
        assert_eq!(pattern(4), vec![0, 1, 2, 3]);
        assert_eq!(pattern(300)[251], 0);
    }

    #[test]
    fn write_fully_and_read_back() {
        let store = small_store();
        let data = pattern(70);
        assert_eq!(write_fully(&store, 0, &data).unwrap(), 9);

        let (out, stop) = read_until_stop(&store, 0, 1000).unwrap();
        assert_eq!(out, data);
        assert_eq!(stop, ReadOutcome::EndOfData);
    }

    #[test]
    fn read_until_stop_reports_hole() {
        let store = small_store();
        write_fully(&store, 0, b"abc").unwrap();
        write_fully(&store, 16, b"xyz").unwrap();

        let (out, stop) = read_until_stop(&store, 0, 100).unwrap();
        assert_eq!(out, b"abc\0\0\0\0\0");
        assert_eq!(stop, ReadOutcome::Hole);
    }

    #[test]
    fn faulty_buffer_limits() {
        let mut sink = FaultyBuffer::after(3);
        sink.accept(b"ab").unwrap();
        assert!(sink.accept(b"cd").is_err());
        assert_eq!(sink.data(), b"ab");

        let source = FaultyBuffer::source(b"hello".to_vec(), 2);
        let mut dst = [0u8; 2];
        source.provide(&mut dst).unwrap();
        assert!(source.provide(&mut [0u8; 3]).is_err());
        assert!(FaultyBuffer::always().accept(b"x").is_err());
    }
}
