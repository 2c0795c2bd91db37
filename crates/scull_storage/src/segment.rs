//! Segments (quantum sets) and the chain they form.
//!
//! The chain is an arena: segment `n` lives at index `n` of one vector,
//! so walking to a segment is an index and growing the chain is a single
//! fallible reservation.

use crate::alloc::{self, MemoryBudget};
use crate::block::Block;
use crate::error::{StoreError, StoreResult};
use crate::geometry::Geometry;
use std::mem;
use tracing::{debug, warn};

/// Bytes charged for one segment node.
const SEGMENT_NODE_BYTES: usize = mem::size_of::<Segment>();

/// Bytes charged per slot of a slot array.
const SLOT_BYTES: usize = mem::size_of::<Option<Block>>();

/// A quantum set: a fixed array of optional blocks.
///
/// The slot array itself is allocated on the first write that lands in
/// this segment; a segment created only to walk past it has none.
#[derive(Debug, Default)]
pub struct Segment {
    slots: Option<Box<[Option<Block>]>>,
}

impl Segment {
    /// Whether the slot array has been allocated.
    #[must_use]
    pub fn has_slots(&self) -> bool {
        self.slots.is_some()
    }

    /// Length of the slot array, if allocated.
    #[must_use]
    pub fn slot_count(&self) -> Option<usize> {
        self.slots.as_ref().map(|slots| slots.len())
    }

    /// Whether a block is present at `slot`.
    #[must_use]
    pub fn has_block(&self, slot: usize) -> bool {
        self.block(slot).is_some()
    }

    /// Indices of the slots holding a block, in ascending order.
    pub fn block_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .flat_map(|slots| slots.iter().enumerate())
            .filter_map(|(index, slot)| slot.as_ref().map(|_| index))
    }

    pub(crate) fn block(&self, slot: usize) -> Option<&Block> {
        self.slots.as_ref()?.get(slot)?.as_ref()
    }

    /// Returns the block at `slot`, allocating the slot array and the
    /// block as needed.
    pub(crate) fn block_mut(
        &mut self,
        slot: usize,
        geometry: &Geometry,
        budget: &mut MemoryBudget,
    ) -> StoreResult<&mut Block> {
        let slots = match self.slots.take() {
            Some(slots) => slots,
            None => {
                let slots = alloc::filled(budget, geometry.qset_size, SLOT_BYTES, || None)?;
                debug!(qset_size = geometry.qset_size, "allocated slot array");
                slots
            }
        };
        let slots = self.slots.insert(slots);
        let slot_count = slots.len();

        let entry = slots.get_mut(slot).ok_or_else(|| {
            StoreError::invalid_argument(format!(
                "slot {slot} outside segment of {slot_count} slots"
            ))
        })?;
        let block = match entry.take() {
            Some(block) => block,
            None => Block::allocate(geometry.quantum_size, budget)?,
        };
        Ok(entry.insert(block))
    }

    fn block_count(&self) -> usize {
        self.block_slots().count()
    }
}

/// Counts of what a release walk freed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Released {
    pub(crate) segments: usize,
    pub(crate) blocks: usize,
}

/// The owned list of segments backing a store.
///
/// Segment `n` of the linear address space is `segments[n]`; each
/// segment exclusively owns its blocks.
#[derive(Debug, Default)]
pub(crate) struct Chain {
    segments: Vec<Segment>,
}

impl Chain {
    pub(crate) fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the segment at `index`, linking fresh empty segments for
    /// every missing node on the way. Never allocates blocks.
    ///
    /// Room for the missing nodes is reserved up front without aborting
    /// on allocator refusal. On failure the segments already linked stay
    /// in the chain.
    pub(crate) fn follow(
        &mut self,
        index: usize,
        budget: &mut MemoryBudget,
    ) -> StoreResult<&mut Segment> {
        let len = self.segments.len();
        if index >= len {
            let missing = (index - len).saturating_add(1);
            let bytes = missing.saturating_mul(SEGMENT_NODE_BYTES);
            // a limited budget refuses the node past `affordable` before
            // `push` could outgrow the reservation
            let affordable = budget
                .remaining()
                .map_or(missing, |remaining| remaining / SEGMENT_NODE_BYTES);
            if self.segments.try_reserve(missing.min(affordable)).is_err() {
                warn!(requested = bytes, segments = missing, "allocator refused segment nodes");
                return Err(StoreError::allocation_failure(bytes));
            }
            for _ in 0..missing {
                budget.charge(SEGMENT_NODE_BYTES)?;
                self.segments.push(Segment::default());
            }
            debug!(linked = missing, segments = self.segments.len(), "linked new segments");
        }
        self.segments
            .get_mut(index)
            .ok_or_else(|| StoreError::allocation_failure(SEGMENT_NODE_BYTES))
    }

    /// Iterates the segments from the head.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.segments.iter()
    }

    /// Frees every segment and block, leaving the chain empty.
    pub(crate) fn release(&mut self) -> Released {
        let segments = mem::take(&mut self.segments);
        Released {
            segments: segments.len(),
            blocks: segments.iter().map(Segment::block_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Geometry {
        Geometry::new(8, 4)
    }

    #[test]
    fn follow_builds_chain_to_index() {
        let mut chain = Chain::default();
        let mut budget = MemoryBudget::default();

        let segment = chain.follow(3, &mut budget).unwrap();
        assert!(!segment.has_slots());
        assert_eq!(chain.iter().count(), 4);
        assert_eq!(budget.used(), 4 * SEGMENT_NODE_BYTES);
    }

    #[test]
    fn follow_reuses_existing_segments() {
        let mut chain = Chain::default();
        let mut budget = MemoryBudget::default();

        chain.follow(2, &mut budget).unwrap();
        let used = budget.used();
        chain.follow(1, &mut budget).unwrap();
        chain.follow(2, &mut budget).unwrap();
        assert_eq!(chain.iter().count(), 3);
        assert_eq!(budget.used(), used);
    }

    #[test]
    fn follow_never_allocates_blocks() {
        let mut chain = Chain::default();
        let mut budget = MemoryBudget::default();
        chain.follow(5, &mut budget).unwrap();
        assert!(chain.iter().all(|s| !s.has_slots() && s.block_count() == 0));
    }

    #[test]
    fn follow_keeps_partial_progress_on_failure() {
        let mut chain = Chain::default();
        let mut budget = MemoryBudget::new(Some(2 * SEGMENT_NODE_BYTES));

        let err = chain.follow(4, &mut budget).unwrap_err();
        assert!(matches!(err, StoreError::AllocationFailure { .. }));
        assert_eq!(chain.iter().count(), 2);
    }

    #[test]
    fn follow_far_index_under_limit_stops_at_budget() {
        let mut chain = Chain::default();
        let mut budget = MemoryBudget::new(Some(3 * SEGMENT_NODE_BYTES));

        let err = chain.follow(usize::MAX / 2, &mut budget).unwrap_err();
        assert!(matches!(err, StoreError::AllocationFailure { .. }));
        assert_eq!(chain.iter().count(), 3);
    }

    #[test]
    fn block_mut_allocates_slot_array_and_block() {
        let mut segment = Segment::default();
        let mut budget = MemoryBudget::default();

        segment.block_mut(2, &small(), &mut budget).unwrap();
        assert_eq!(segment.slot_count(), Some(4));
        assert!(segment.has_block(2));
        assert!(!segment.has_block(1));
        assert_eq!(segment.block_slots().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn block_mut_returns_existing_block() {
        let mut segment = Segment::default();
        let mut budget = MemoryBudget::default();

        segment
            .block_mut(1, &small(), &mut budget)
            .unwrap()
            .region_mut(0, 2)
            .copy_from_slice(b"hi");
        let used = budget.used();
        let block = segment.block_mut(1, &small(), &mut budget).unwrap();
        assert_eq!(block.region(0, 2), b"hi");
        assert_eq!(budget.used(), used);
    }

    #[test]
    fn block_mut_rejects_slot_out_of_range() {
        let mut segment = Segment::default();
        let mut budget = MemoryBudget::default();
        assert!(segment.block_mut(4, &small(), &mut budget).is_err());
    }

    #[test]
    fn release_counts_and_empties() {
        let mut chain = Chain::default();
        let mut budget = MemoryBudget::default();

        chain
            .follow(0, &mut budget)
            .unwrap()
            .block_mut(0, &small(), &mut budget)
            .unwrap();
        let tail = chain.follow(2, &mut budget).unwrap();
        tail.block_mut(1, &small(), &mut budget).unwrap();
        tail.block_mut(3, &small(), &mut budget).unwrap();

        let released = chain.release();
        assert_eq!(
            released,
            Released {
                segments: 3,
                blocks: 3
            }
        );
        assert!(chain.is_empty());
        assert_eq!(chain.release(), Released::default());
    }

    #[test]
    fn drop_long_chain() {
        let mut chain = Chain::default();
        let mut budget = MemoryBudget::default();
        chain.follow(200_000, &mut budget).unwrap();
        assert_eq!(chain.iter().count(), 200_001);
        drop(chain);
    }

    #[test]
    fn follow_unbounded_reports_allocator_refusal() {
        let mut chain = Chain::default();
        let mut budget = MemoryBudget::default();
        chain.follow(2, &mut budget).unwrap();

        let err = chain.follow(usize::MAX / 2, &mut budget).unwrap_err();
        assert!(matches!(err, StoreError::AllocationFailure { .. }));
        assert_eq!(chain.iter().count(), 3);
        assert_eq!(budget.used(), 3 * SEGMENT_NODE_BYTES);
    }
}
