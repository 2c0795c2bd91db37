//! The store: a sparse linear address space over a chain of segments.

use crate::alloc::MemoryBudget;
use crate::buffer::{ByteSink, ByteSource};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::geometry::Geometry;
use crate::lock::{self, Interrupt};
use crate::seek::{self, SeekBase};
use crate::segment::{Chain, Segment};
use crate::snapshot::StoreSnapshot;
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace};

/// What a single read produced.
///
/// Holes and end-of-data both move zero bytes but are different
/// outcomes: past a hole there may be more data, past end-of-data there
/// is none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// This many bytes were copied to the sink.
    Transferred(usize),
    /// The offset lies inside the logical size but its block was never
    /// written.
    Hole,
    /// The offset is at or past the logical size.
    EndOfData,
}

impl ReadOutcome {
    /// Bytes copied (zero for holes and end-of-data).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Transferred(n) => *n,
            Self::Hole | Self::EndOfData => 0,
        }
    }

    /// Returns true if no bytes were copied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct StoreState {
    chain: Chain,
    size: u64,
    geometry: Geometry,
    budget: MemoryBudget,
}

/// A growable, sparse, in-memory byte store.
///
/// Bytes live in blocks of `quantum_size` bytes, grouped `qset_size` to a
/// segment; segments form a chain. Segments and blocks are
/// allocated on first write and released only by [`StoreGuard::trim`] or
/// by dropping the store.
///
/// Every operation runs under one mutex. Use [`Store::lock`] or
/// [`Store::lock_interruptible`] to get a [`StoreGuard`], or the
/// convenience methods here, which take the lock for a single call.
///
/// # Example
///
/// ```rust
/// use scull_storage::{ReadOutcome, Store};
///
/// let store = Store::default();
/// assert_eq!(store.write(0, b"hello".as_slice(), 5).unwrap(), 5);
///
/// let mut buf = [0u8; 16];
/// let outcome = store.read(0, buf.as_mut_slice(), 16).unwrap();
/// assert_eq!(outcome, ReadOutcome::Transferred(5));
/// assert_eq!(&buf[..5], b"hello");
/// assert_eq!(store.read(5, buf.as_mut_slice(), 16).unwrap(), ReadOutcome::EndOfData);
/// ```
#[derive(Debug)]
pub struct Store {
    defaults: Geometry,
    state: Mutex<StoreState>,
}

impl Default for Store {
    fn default() -> Self {
        Self::from_config(StoreConfig::default())
    }
}

impl Store {
    /// Creates an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: StoreConfig) -> Self {
        Self {
            defaults: config.geometry,
            state: Mutex::new(StoreState {
                chain: Chain::default(),
                size: 0,
                geometry: config.geometry,
                budget: MemoryBudget::new(config.memory_limit),
            }),
        }
    }

    /// The geometry restored by every trim.
    #[must_use]
    pub fn default_geometry(&self) -> Geometry {
        self.defaults
    }

    /// Takes the lock, waiting as long as needed.
    pub fn lock(&self) -> StoreGuard<'_> {
        self.guard(self.state.lock())
    }

    /// Takes the lock only if it is free.
    pub fn try_lock(&self) -> Option<StoreGuard<'_>> {
        self.state.try_lock().map(|state| self.guard(state))
    }

    /// Takes the lock, abandoning the wait once `interrupt` is raised.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Interrupted`] if the wait was abandoned. The
    /// store is untouched in that case.
    pub fn lock_interruptible(&self, interrupt: &Interrupt) -> StoreResult<StoreGuard<'_>> {
        lock::lock_interruptible(&self.state, interrupt).map(|state| self.guard(state))
    }

    fn guard<'a>(&'a self, state: MutexGuard<'a, StoreState>) -> StoreGuard<'a> {
        StoreGuard {
            state,
            defaults: self.defaults,
        }
    }

    /// Reads under a freshly taken lock. See [`StoreGuard::read`].
    ///
    /// # Errors
    ///
    /// See [`StoreGuard::read`].
    pub fn read<S: ByteSink + ?Sized>(
        &self,
        offset: u64,
        sink: &mut S,
        max_len: usize,
    ) -> StoreResult<ReadOutcome> {
        self.lock().read(offset, sink, max_len)
    }

    /// Writes under a freshly taken lock. See [`StoreGuard::write`].
    ///
    /// # Errors
    ///
    /// See [`StoreGuard::write`].
    pub fn write<S: ByteSource + ?Sized>(
        &self,
        offset: u64,
        source: &S,
        len: usize,
    ) -> StoreResult<usize> {
        self.lock().write(offset, source, len)
    }

    /// Computes a new cursor position. See [`StoreGuard::seek`].
    ///
    /// # Errors
    ///
    /// See [`StoreGuard::seek`].
    pub fn seek(&self, current: u64, base: SeekBase, offset: i64) -> StoreResult<u64> {
        self.lock().seek(current, base, offset)
    }

    /// Releases all data. See [`StoreGuard::trim`].
    pub fn trim(&self) {
        self.lock().trim();
    }

    /// Current logical size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.lock().size()
    }

    /// Geometry currently in effect.
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        self.lock().geometry()
    }

    /// Takes a structural snapshot. See [`StoreGuard::snapshot`].
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.lock().snapshot()
    }
}

/// Exclusive access to a [`Store`].
///
/// Holding the guard keeps every other caller out until it is dropped.
#[derive(Debug)]
pub struct StoreGuard<'a> {
    state: MutexGuard<'a, StoreState>,
    defaults: Geometry,
}

impl StoreGuard<'_> {
    /// Logical size: one past the highest byte ever written.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.state.size
    }

    /// Geometry currently in effect.
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        self.state.geometry
    }

    /// Returns true if no segment has been allocated since the last trim.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.chain.is_empty()
    }

    /// Bytes currently held by blocks, slot arrays and segment nodes.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.state.budget.used()
    }

    /// Changes the geometry of an empty store.
    ///
    /// The change lasts until the next trim, which restores the store's
    /// default geometry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotEmpty`] if the store holds any segment,
    /// or [`StoreError::InvalidGeometry`] if the geometry is unusable.
    pub fn set_geometry(&mut self, geometry: Geometry) -> StoreResult<()> {
        geometry.validate()?;
        if !self.is_empty() {
            return Err(StoreError::NotEmpty);
        }
        debug!(
            quantum_size = geometry.quantum_size,
            qset_size = geometry.qset_size,
            "geometry changed"
        );
        self.state.geometry = geometry;
        Ok(())
    }

    /// Returns the segment at `index`, linking empty segments up to it.
    ///
    /// Blocks are never allocated here.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AllocationFailure`] if a segment could not be
    /// obtained; segments linked before the failure are kept.
    pub fn follow(&mut self, index: usize) -> StoreResult<&Segment> {
        let state = &mut *self.state;
        let segment = state.chain.follow(index, &mut state.budget)?;
        Ok(&*segment)
    }

    /// Copies up to `max_len` bytes at `offset` into `sink`.
    ///
    /// The transfer stops at the logical size and at the edge of the
    /// block holding `offset`; callers loop, advancing by the returned
    /// length, to read more.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CopyFault`] if the sink refuses the bytes, or
    /// [`StoreError::AllocationFailure`] if walking the chain needed a
    /// segment that could not be obtained.
    pub fn read<S: ByteSink + ?Sized>(
        &mut self,
        offset: u64,
        sink: &mut S,
        max_len: usize,
    ) -> StoreResult<ReadOutcome> {
        let state = &mut *self.state;
        if offset >= state.size {
            return Ok(ReadOutcome::EndOfData);
        }
        let remaining = usize::try_from(state.size - offset).unwrap_or(usize::MAX);

        let geometry = state.geometry;
        let pos = geometry.locate(offset)?;
        let segment = state.chain.follow(pos.segment, &mut state.budget)?;

        let Some(block) = segment.block(pos.slot) else {
            trace!(offset, segment = pos.segment, slot = pos.slot, "read hit hole");
            return Ok(ReadOutcome::Hole);
        };

        let count = max_len.min(remaining).min(pos.room(&geometry));
        debug_assert!(pos.offset + count <= block.capacity());
        sink.accept(block.region(pos.offset, count))?;

        trace!(
            offset,
            segment = pos.segment,
            slot = pos.slot,
            bytes = count,
            "read"
        );
        Ok(ReadOutcome::Transferred(count))
    }

    /// Copies up to `len` bytes from `source` to `offset`.
    ///
    /// The transfer stops at the edge of the block holding `offset`. The
    /// segment, slot array and block are allocated if missing. The
    /// logical size grows to cover the written range and never shrinks.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AllocationFailure`] if a segment, slot array
    /// or block could not be obtained (nothing is copied), or
    /// [`StoreError::CopyFault`] if the source cannot supply the bytes
    /// (the logical size is left unchanged).
    pub fn write<S: ByteSource + ?Sized>(
        &mut self,
        offset: u64,
        source: &S,
        len: usize,
    ) -> StoreResult<usize> {
        let state = &mut *self.state;
        let geometry = state.geometry;
        let pos = geometry.locate(offset)?;
        let count = len.min(pos.room(&geometry));
        let end = offset.checked_add(count as u64).ok_or_else(|| {
            StoreError::invalid_argument(format!("write of {count} bytes at {offset} overflows"))
        })?;

        let block = state
            .chain
            .follow(pos.segment, &mut state.budget)?
            .block_mut(pos.slot, &geometry, &mut state.budget)?;
        debug_assert!(pos.offset + count <= block.capacity());
        source.provide(block.region_mut(pos.offset, count))?;

        state.size = state.size.max(end);
        trace!(
            offset,
            segment = pos.segment,
            slot = pos.slot,
            bytes = count,
            size = state.size,
            "write"
        );
        Ok(count)
    }

    /// Computes a cursor position from `base` and a signed `offset`.
    ///
    /// Positions past the logical size are allowed; nothing is read or
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] if the position would be
    /// negative.
    pub fn seek(&self, current: u64, base: SeekBase, offset: i64) -> StoreResult<u64> {
        let origin = match base {
            SeekBase::Start => 0,
            SeekBase::Current => current,
            SeekBase::End => self.state.size,
        };
        seek::resolve(origin, offset)
    }

    /// Frees every segment and block, zeroes the logical size and
    /// restores the default geometry. Trimming an empty store is a no-op.
    pub fn trim(&mut self) {
        let state = &mut *self.state;
        let released = state.chain.release();
        let bytes = state.budget.used();
        state.budget.reset();
        state.size = 0;
        state.geometry = self.defaults;
        debug!(
            segments = released.segments,
            blocks = released.blocks,
            bytes,
            "trimmed store"
        );
    }

    /// Takes a read-only structural snapshot of the chain.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot::capture(
            self.state.geometry,
            self.state.size,
            self.state.budget.used(),
            self.state.chain.iter(),
        )
    }
}
